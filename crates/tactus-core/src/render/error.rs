// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Error types for the rendering contracts.

use std::error::Error;
use std::fmt;
use std::path::PathBuf;

/// Failure while capturing a rendered frame to a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameDumpError {
    /// The renderer has no frame capture capability at all.
    Unsupported,
    /// The frame existed but could not be written out.
    Io {
        /// Destination the frame was being written to.
        path: PathBuf,
        /// Underlying I/O failure, already rendered to text.
        details: String,
    },
}

impl fmt::Display for FrameDumpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameDumpError::Unsupported => {
                write!(f, "This renderer cannot capture frames")
            }
            FrameDumpError::Io { path, details } => {
                write!(f, "Failed to write frame to '{}': {details}", path.display())
            }
        }
    }
}

impl Error for FrameDumpError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_dump_error_display() {
        assert_eq!(
            FrameDumpError::Unsupported.to_string(),
            "This renderer cannot capture frames"
        );

        let error = FrameDumpError::Io {
            path: PathBuf::from("capture-000042.bmp"),
            details: "permission denied".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Failed to write frame to 'capture-000042.bmp': permission denied"
        );
    }
}
