use std::process::ExitCode;

/// Process outcome with an optional trailer printed before exiting.
pub struct Exit {
    code: ExitCode,
    message: Option<String>,
}

impl Exit {
    pub fn success() -> Self {
        Self {
            code: ExitCode::SUCCESS,
            message: None,
        }
    }

    pub fn error() -> Self {
        Self {
            code: ExitCode::FAILURE,
            message: None,
        }
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn process(self) -> ExitCode {
        if let Some(message) = self.message {
            println!("{message}");
        }
        self.code
    }
}
