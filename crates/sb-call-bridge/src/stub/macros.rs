//! Compile-time typed stubs.

/// Declare a typed host-side stub for a script object.
///
/// Each declared function becomes a method that encodes its arguments,
/// dispatches the call and returns a `PendingCallHandle` typed by the
/// declared return type (`()` when omitted).
///
/// ```ignore
/// script_interface! {
///     /// Calculator object living in the script runtime.
///     pub struct Calculator as "calc" {
///         fn add(a: i64, b: i64) -> i64;
///         fn reset();
///         fn fetch_user(id: u64) -> User as "loadUser";
///         fn dump() -> RawResponse;
///     }
/// }
///
/// let calc = Calculator::new(dispatcher);
/// calc.add(1, 2)?.on_success(|sum| println!("{:?}", sum));
/// ```
///
/// Without `as "variable"` the functions are called as script globals.
/// `as "remoteName"` after a function overrides the script-side name.
#[macro_export]
macro_rules! script_interface {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident $(as $variable:literal)? {
            $(
                $(#[$fn_meta:meta])*
                fn $method:ident ( $($arg:ident : $arg_ty:ty),* $(,)? ) $(-> $ret:ty)? $(as $remote:literal)? ;
            )*
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone)]
        $vis struct $name {
            dispatcher: ::std::sync::Arc<$crate::CallDispatcher>,
        }

        impl $name {
            /// Script variable holding the object, `None` for globals.
            pub const VARIABLE: ::std::option::Option<&'static str> =
                $crate::__sb_variable!($($variable)?);

            pub fn new(dispatcher: ::std::sync::Arc<$crate::CallDispatcher>) -> Self {
                Self { dispatcher }
            }

            pub fn dispatcher(&self) -> &::std::sync::Arc<$crate::CallDispatcher> {
                &self.dispatcher
            }

            $(
                $(#[$fn_meta])*
                pub fn $method(
                    &self,
                    $($arg: $arg_ty),*
                ) -> ::std::result::Result<
                    $crate::PendingCallHandle<$crate::__sb_ret!($($ret)?)>,
                    $crate::BridgeError,
                > {
                    let function = $crate::FunctionDescriptor::new(
                        ::std::stringify!($method),
                        $crate::RemoteFunctionRef::new(
                            Self::VARIABLE,
                            $crate::__sb_remote_name!($method $(, $remote)?),
                        ),
                    );
                    let args: ::std::vec::Vec<$crate::__private::Value> = ::std::vec![
                        $($crate::stub::encode_arg(::std::stringify!($method), &$arg)?),*
                    ];
                    self.dispatcher
                        .call::<$crate::__sb_ret!($($ret)?)>(function, args)
                }
            )*
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __sb_variable {
    () => {
        ::std::option::Option::None
    };
    ($variable:literal) => {
        ::std::option::Option::Some($variable)
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __sb_remote_name {
    ($method:ident) => {
        ::std::stringify!($method)
    };
    ($method:ident, $remote:literal) => {
        $remote
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __sb_ret {
    () => {
        ()
    };
    ($ret:ty) => {
        $ret
    };
}
