//! Screen utilities.

/// Implements a `.builder()` function, that returns a closure expecting an
/// `&AppState` arg. This reduces a boilerplate required for every returned
/// screen controller, as it have to be a boxed closure that produces a dynamic
/// screen controller.
macro_rules! impl_builder {
    ($screen:ty) => {
        impl $screen {
            pub(crate) fn builder() -> crate::ui::screen::ScreenControllerBuilder {
                Box::new(|app_state| {
                    Box::new(<$screen>::new(app_state)) as Box<dyn crate::ui::screen::ScreenController>
                })
            }
        }
    };
}

pub(crate) use impl_builder;
