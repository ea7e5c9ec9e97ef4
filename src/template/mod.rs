//! Template rendering for configuration files and step commands.
//!
//! Templates are plain text with `$name` placeholders:
//!
//! ```text
//! [agents]
//! $target_hosts
//!
//! [agents:vars]
//! ansible_user=$ansible_user
//! ```
//!
//! `${name}` delimits a name that is directly followed by identifier
//! characters, and `$$` renders a literal `$`. A `$` that does not start a
//! placeholder is copied through unchanged.

mod render;

pub use render::{Bindings, TemplateError, placeholders, render_template, vars};
