//! All state shared by the type checker, the optimizer and the driver.
use diagnostics::Diagnostics;
use termcolor::WriteColor;

pub struct Context {
    pub diagnostics: Diagnostics,
}

impl Context {
    pub fn new(writer: Box<dyn WriteColor>) -> Self {
        Self {
            diagnostics: Diagnostics::new(writer),
        }
    }

    /// A context whose messages are only kept in memory. Meant for tests,
    /// which inspect `diagnostics.messages()` instead of the output.
    pub fn dummy() -> Self {
        Self::new(Box::new(dummy_writer()))
    }
}

// dummy_writer returns a WriteColor meant for use in tests.
pub fn dummy_writer() -> impl WriteColor {
    use termcolor::Buffer;
    Buffer::no_color()
}
