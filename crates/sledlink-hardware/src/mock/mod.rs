//! Mock device implementations for testing and development.
//!
//! This module provides a simulated sled reader and scanner service that can
//! be driven programmatically without physical hardware. Each mock comes with
//! a control handle and records every call it receives.

pub mod reader;
pub mod scanner;

// Re-export commonly used types
pub use reader::{MockCall, MockReader, MockReaderHandle};
pub use scanner::{MockScanner, MockScannerHandle, ScannerCall};
