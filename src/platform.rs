use std::process;

/// Standard Unix exit codes; usage errors (2) are reported by clap
#[derive(Debug, Clone, Copy)]
pub enum ExitCode {
    GeneralError = 1,
}

impl ExitCode {
    pub fn exit(self) -> ! {
        process::exit(self as i32)
    }
}
