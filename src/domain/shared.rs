//! 共有カーネル
//!
//! デプロイとプロビジョニングの両方で使用される外部コマンドのエラー型を定義

use thiserror::Error;

/// Failure of an external tool (package manager, container engine,
/// certificate client, service manager).
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Failed to run `{program}`: {source}")]
    SpawnFailed {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` failed with exit code {}: {}", display_code(.code), .stderr.trim())]
    NonZeroExit {
        command: String,
        code: Option<i32>,
        stderr: String,
    },
}

impl CommandError {
    /// Exit code to hand back to the calling automation.
    pub fn exit_code(&self) -> i32 {
        match self {
            CommandError::NonZeroExit {
                code: Some(code), ..
            } if *code != 0 => *code,
            _ => 1,
        }
    }
}

fn display_code(code: &Option<i32>) -> String {
    code.map_or_else(|| "none (killed by signal)".to_string(), |c| c.to_string())
}
