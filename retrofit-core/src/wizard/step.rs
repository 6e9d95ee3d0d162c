use std::fmt;

/// The four screens of the wizard, in order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Step {
    #[default]
    Address = 1,
    Options = 2,
    Results = 3,
    Contractors = 4,
}

impl Step {
    pub const ALL: [Step; 4] = [Self::Address, Self::Options, Self::Results, Self::Contractors];

    pub fn number(&self) -> u8 {
        *self as u8
    }

    pub fn from_number(n: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|step| step.number() == n)
    }

    pub fn next(&self) -> Option<Self> {
        Self::from_number(self.number() + 1)
    }

    pub fn previous(&self) -> Option<Self> {
        self.number().checked_sub(1).and_then(Self::from_number)
    }

    pub fn is_terminal(&self) -> bool {
        self.next().is_none()
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Address => "Address",
            Self::Options => "Retrofit options",
            Self::Results => "Break-even",
            Self::Contractors => "Contractors",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "step {} ({})", self.number(), self.title())
    }
}
