//! Macros to reduce boilerplate for the fixed-vocabulary enums

/// Macro to generate Display and FromStr implementations for enums
///
/// Parsing is case-insensitive; the first string listed for a variant is
/// the one used for display.
///
/// # Usage
///
/// ```rust,ignore
/// use crate::error::TrackerError;
///
/// enum_display_fromstr!(
///     Difficulty,
///     TrackerError::invalid_difficulty,
///     {
///         Easy => "easy", alias "e";
///         Medium => "medium", alias "m";
///         Hard => "hard", alias "h";
///     }
/// );
/// ```
#[macro_export]
macro_rules! enum_display_fromstr {
    (
        $enum_name:ident,
        $error_fn:path,
        { $($variant:ident => $str:literal $(, alias $alias:literal)*);+ $(;)? }
    ) => {
        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $($enum_name::$variant => write!(f, $str),)+
                }
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = $crate::error::TrackerError;

            fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($str $(| $alias)* => Ok($enum_name::$variant),)+
                    _ => Err($error_fn(s.to_string())),
                }
            }
        }
    };
}
