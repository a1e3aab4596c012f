//! Macro for implementing Display and FromStr for closed string enums
//!
//! Used for enums that travel as lowercase strings (error kinds in the result
//! envelope, session events forwarded to the UI shell).
//!
//! # Example
//!
//! ```rust
//! use bookdesk_domain::impl_domain_status_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Verdict {
//!     Allowed,
//!     Denied,
//! }
//!
//! impl_domain_status_conversions!(Verdict {
//!     Allowed => "allowed",
//!     Denied => "denied",
//! });
//!
//! assert_eq!(Verdict::Denied.to_string(), "denied");
//! assert_eq!("ALLOWED".parse::<Verdict>(), Ok(Verdict::Allowed));
//! ```

/// Implements Display and FromStr traits for string-mapped enums
///
/// Display writes the mapped lowercase string; FromStr parses
/// case-insensitively and reports the enum name on failure.
#[macro_export]
macro_rules! impl_domain_status_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(Self::$variant => write!(f, $str),)+
                }
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.to_lowercase().as_str() {
                    $($str => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}
