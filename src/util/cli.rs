use colored::{Color, Colorize as _};
use std::fmt::{Debug, Display};

pub mod colors {
    use colored::Color;

    pub const ERROR: Color = Color::BrightRed;
    pub const WARNING: Color = Color::BrightYellow;
    pub const VICTORY: Color = Color::BrightGreen;
    pub const RUNNING: Color = Color::BrightGreen;
    pub const STOPPED: Color = Color::BrightBlack;
}

#[derive(Clone, Debug)]
pub struct TextWrapper(pub textwrap::Wrapper<'static, textwrap::NoHyphenation>);

impl TextWrapper {
    pub fn standard() -> Self {
        Self(textwrap::Wrapper::with_splitter(
            textwrap::termwidth(),
            textwrap::NoHyphenation,
        ))
    }

    pub fn fill(&self, text: &str) -> String {
        self.0.fill(text)
    }
}

#[derive(Clone, Copy, Debug)]
pub enum Label {
    Error,
    ActionRequest,
    Victory,
}

impl Label {
    fn color(self) -> Color {
        match self {
            Self::Error => colors::ERROR,
            Self::ActionRequest => colors::WARNING,
            Self::Victory => colors::VICTORY,
        }
    }

    fn exit_code(self) -> i8 {
        match self {
            Self::Victory => 0,
            _ => 1,
        }
    }
}

#[derive(Debug)]
pub struct Report {
    label: Label,
    msg: String,
    detail: String,
}

impl Report {
    pub fn new(label: Label, msg: impl Display, detail: impl Display) -> Self {
        Self {
            label,
            msg: msg.to_string(),
            detail: detail.to_string(),
        }
    }

    pub fn error(msg: impl Display, detail: impl Display) -> Self {
        Self::new(Label::Error, msg, detail)
    }

    pub fn action_request(msg: impl Display, detail: impl Display) -> Self {
        Self::new(Label::ActionRequest, msg, detail)
    }

    pub fn victory(msg: impl Display, detail: impl Display) -> Self {
        Self::new(Label::Victory, msg, detail)
    }

    pub fn exit_code(&self) -> i8 {
        self.label.exit_code()
    }

    fn render(&self, wrapper: &TextWrapper) -> String {
        static INDENT: &str = "    ";
        let head = wrapper.fill(&self.msg).color(self.label.color()).bold();
        if self.detail.is_empty() {
            return head.to_string();
        }
        let detail_wrapper = TextWrapper(
            wrapper
                .clone()
                .0
                .initial_indent(INDENT)
                .subsequent_indent(INDENT),
        );
        format!("{}\n{}", head, detail_wrapper.fill(&self.detail))
    }

    pub fn print(&self, wrapper: &TextWrapper) {
        match self.label {
            Label::Victory => println!("{}", self.render(wrapper)),
            _ => eprintln!("{}", self.render(wrapper)),
        }
    }
}

pub trait Reportable: Debug {
    fn report(&self) -> Report;
}
