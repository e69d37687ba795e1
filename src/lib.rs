//! Lexer for Apache-httpd-style configuration files.
//!
//! Converts raw configuration text into a flat, ordered sequence of
//! typed tokens for a downstream grammar parser: line and nested
//! block comments, XML-like tag markers, and option/value pairs,
//! including backslash line-continuations and here-document values.
//! Line numbers are tracked across every construct for diagnostics.
//!
//! # Quick start
//!
//! ```
//! use apacheconf::{TokenKind, tokenize};
//!
//! let input = "\
//! ## server identity
//! ServerName example.com
//! <VirtualHost *:80>
//!     DocumentRoot \"/var/www/html\"
//! </VirtualHost>
//! ";
//! let tokens = tokenize(input).unwrap();
//! assert_eq!(tokens.len(), 5);
//! assert_eq!(tokens[0].kind, TokenKind::Comment);
//! assert_eq!(tokens[2].kind, TokenKind::OpenTag);
//! assert_eq!(tokens[2].text, "VirtualHost *:80");
//! assert_eq!(
//!     tokens[3].kind,
//!     TokenKind::OptionAndValue { name: "DocumentRoot".to_string() }
//! );
//! assert_eq!(tokens[3].text, "/var/www/html");
//! ```
//!
//! # Multi-line values
//!
//! ```
//! use apacheconf::tokenize;
//!
//! let tokens = tokenize("Allow from 10.0.0.1 \\\n10.0.0.2\n").unwrap();
//! assert_eq!(tokens[0].text, "from 10.0.0.1 10.0.0.2");
//!
//! let tokens = tokenize("Motd <<EOT\nwelcome\nEOT\n").unwrap();
//! assert_eq!(tokens[0].text, "welcome\n");
//! ```

// Allow noisy pedantic lints that don't add value for
// a library crate.
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions
)]

pub mod lexer;
pub mod token;
mod value;

pub use lexer::{LexError, LexErrorKind, tokenize};
pub use token::{Span, Token, TokenKind};
