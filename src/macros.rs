pub use enclose::*;

/// Builds a [`Listener`](crate::Listener) from a closure body. Names in the
/// leading parentheses are cloned into the closure.
///
/// ```ignore
/// let model = model.downgrade();
/// let listener = listener!((model, renders) => {
///     renders.set(renders.get() + 1);
///     if let Some(state) = model.state() {
///         draw(&state);
///     }
/// });
/// ```
#[macro_export]
macro_rules! listener {
    (( $($d_tt:tt)* ) => $($b:tt)*) => {
        $crate::Listener::new($crate::macros::enclose!(($( $d_tt )*) move || { $($b)* }))
    };
    (=> $($b:tt)*) => {
        $crate::Listener::new(move || { $($b)* })
    };
}

/// Declares a state struct together with its patch type and the shallow
/// [`Merge`](crate::Merge) impl between them.
///
/// The patch has one `Option` field per state field and a chaining setter
/// of the same name.
///
/// ```ignore
/// state! {
///     #[derive(Clone, Debug)]
///     pub struct Counter as CounterPatch {
///         pub count: i64,
///         pub step: i64,
///     }
/// }
///
/// model.merge(CounterPatch::default().count(1))?;
/// ```
#[macro_export]
macro_rules! state {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident as $patch:ident {
            $( $(#[$fmeta:meta])* $fvis:vis $field:ident : $ty:ty ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $( $(#[$fmeta])* $fvis $field: $ty, )*
        }

        #[derive(Default)]
        $vis struct $patch {
            $( $fvis $field: ::std::option::Option<$ty>, )*
        }

        #[allow(dead_code)]
        impl $patch {
            $(
                pub fn $field(mut self, value: $ty) -> Self {
                    self.$field = ::std::option::Option::Some(value);
                    self
                }
            )*
        }

        impl $crate::Merge<$patch> for $name {
            fn merge(&self, patch: $patch) -> Self {
                $name {
                    $(
                        $field: match patch.$field {
                            ::std::option::Option::Some(value) => value,
                            ::std::option::Option::None => ::std::clone::Clone::clone(&self.$field),
                        },
                    )*
                }
            }
        }
    };
}
