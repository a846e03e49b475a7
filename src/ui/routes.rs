//! Start routes.
//!
//! The management screen is the root of the navigation and always reachable;
//! the deployment screen is only mounted under the `/init` path.

use super::{
    screen::ScreenControllerBuilder,
    views::{deploy::DeployScreenController, manage::ManageScreenController},
};

pub const INIT_PATH: &str = "/init";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Route {
    Manage,
    Deploy,
}

impl Route {
    /// Route for a start path. Anything but `/init` lands on the root screen.
    pub fn from_path(path: &str) -> Self {
        match path.trim_end_matches('/') {
            INIT_PATH => Route::Deploy,
            _ => Route::Manage,
        }
    }

    /// Routes on the way to this one, root first.
    pub fn parents(self) -> &'static [Route] {
        match self {
            Route::Manage => &[],
            Route::Deploy => &[Route::Manage],
        }
    }

    pub(crate) fn builder(self) -> ScreenControllerBuilder {
        match self {
            Route::Manage => ManageScreenController::builder(),
            Route::Deploy => DeployScreenController::builder(),
        }
    }
}
