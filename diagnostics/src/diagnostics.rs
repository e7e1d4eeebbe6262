//! Collects the errors and warnings of the semantic passes and writes them,
//! colored, to a single writer. The driver asks `errored` to decide whether a
//! routine may still be optimized.
//!
//! Interior mutability through `RefCell`, so not thread-safe.
use srcpos::{MaybeSpanned, Position, Spanned};
use std::{cell::RefCell, fmt};
use termcolor::{Color, ColorSpec, WriteColor};

/// Every reported message is written immediately and also kept, so the
/// counters and tests work off the same record.
pub struct Diagnostics {
    messages: RefCell<Vec<Message>>,
    writer: RefCell<Box<dyn WriteColor>>,
}

/// Anything that can be reported: either a bare message or a message
/// attached to a source position.
pub trait Printable<'b> {
    fn as_maybe_spanned(&'b self) -> MaybeSpanned<&'b dyn fmt::Display>;
}

impl<'b, T: fmt::Display + 'b> Printable<'b> for Spanned<T> {
    fn as_maybe_spanned(&'b self) -> MaybeSpanned<&'b dyn fmt::Display> {
        MaybeSpanned::from(self)
    }
}

impl<'b> Printable<'b> for failure::Error {
    fn as_maybe_spanned(&'b self) -> MaybeSpanned<&'b dyn fmt::Display> {
        MaybeSpanned::WithoutSpan(self)
    }
}

impl Diagnostics {
    pub fn new(writer: Box<dyn WriteColor>) -> Self {
        Self {
            messages: RefCell::new(Vec::new()),
            writer: RefCell::new(writer),
        }
    }

    /// Warnings alone don't count.
    pub fn errored(&self) -> bool {
        self.count(MessageLevel::Error) > 0
    }

    pub fn count(&self, level: MessageLevel) -> usize {
        self.messages
            .borrow()
            .iter()
            .filter(|msg| msg.level == level)
            .count()
    }

    /// All messages emitted so far, in emission order.
    pub fn messages(&self) -> Vec<Message> {
        self.messages.borrow().clone()
    }

    /// One closing line: the number of errors, or a success note with the
    /// number of warnings.
    pub fn write_statistics(&self) {
        let summary = match (
            self.count(MessageLevel::Error),
            self.count(MessageLevel::Warning),
        ) {
            (0, 0) => "Type checking finished successfully without warnings".to_string(),
            (0, 1) => "Type checking finished successfully with a warning".to_string(),
            (0, n) => format!("Type checking finished successfully with {} warnings", n),
            (1, _) => "Found an error. Compilation aborted.".to_string(),
            (n, _) => format!("Found {} errors. Compilation aborted.", n),
        };
        let color = if self.errored() {
            MessageLevel::Error.color()
        } else {
            Some(Color::Green)
        };

        let mut writer = self.writer.borrow_mut();
        let mut output = ColorOutput::new(&mut **writer);
        output.set_style(color, true);
        writeln!(output.writer(), "{}", summary).ok();
    }

    /// Writes the message to the writer given to `new` and records it.
    pub fn emit(&self, level: MessageLevel, kind: MaybeSpanned<&dyn fmt::Display>) {
        let msg = Message {
            level,
            pos: kind.pos(),
            text: format!("{}", *kind),
        };

        msg.write_colored(&mut **self.writer.borrow_mut());
        self.messages.borrow_mut().push(msg);
    }

    pub fn warning<'b, T: Printable<'b> + ?Sized>(&self, kind: &'b T) {
        self.emit(MessageLevel::Warning, kind.as_maybe_spanned())
    }

    pub fn error<'b, T: Printable<'b> + ?Sized>(&self, kind: &'b T) {
        self.emit(MessageLevel::Error, kind.as_maybe_spanned())
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum MessageLevel {
    Error,
    Warning,
}

impl MessageLevel {
    /// `None` is the terminal's default color.
    fn color(self) -> Option<Color> {
        match self {
            MessageLevel::Error => Some(Color::Red),
            MessageLevel::Warning => Some(Color::Yellow),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            MessageLevel::Error => "error",
            MessageLevel::Warning => "warning",
        }
    }
}

/// A message as it was emitted. `pos` is absent for messages that have no
/// source location, e.g. a missing return in an empty function body.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub level: MessageLevel,
    pub pos: Option<Position>,
    pub text: String,
}

impl Message {
    fn write_colored(&self, writer: &mut dyn WriteColor) {
        let mut output = ColorOutput::new(writer);
        output.set_style(self.level.color(), true);
        write!(output.writer(), "{}: ", self.level.name()).ok();

        output.set_style(None, true);
        writeln!(output.writer(), "{}", self.text).ok();

        if let Some(pos) = self.pos {
            output.set_style(Some(Color::Cyan), false);
            writeln!(output.writer(), "  --> {}", pos).ok();
        }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.pos {
            Some(pos) => write!(f, "{} at {}: {}", self.level.name(), pos, self.text),
            None => write!(f, "{}: {}", self.level.name(), self.text),
        }
    }
}

/// Borrows the writer for one message and resets its color when dropped, so
/// output written afterwards is not tinted. Coloring failures are ignored.
struct ColorOutput<'a> {
    writer: &'a mut dyn WriteColor,
}

impl<'a> ColorOutput<'a> {
    fn new(writer: &'a mut dyn WriteColor) -> Self {
        writer.reset().ok();
        Self { writer }
    }

    fn set_style(&mut self, color: Option<Color>, bold: bool) {
        let mut spec = ColorSpec::new();
        spec.set_fg(color).set_bold(bold);
        self.writer.set_color(&spec).ok();
    }

    fn writer(&mut self) -> &mut dyn WriteColor {
        self.writer
    }
}

impl<'a> Drop for ColorOutput<'a> {
    fn drop(&mut self) {
        self.writer.reset().ok();
    }
}
