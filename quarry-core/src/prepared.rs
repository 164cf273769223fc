use std::fmt::Display;

/// A statement prepared by the engine, reusable with different parameters.
///
/// Displays as the SQL text it was prepared from.
pub trait Prepared: Display {
    /// Names of the parameters the statement expects, in binding order.
    fn parameter_names(&self) -> &[String];
}
