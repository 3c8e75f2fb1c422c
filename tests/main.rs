/*!
 * Main test entry point for the subator test suite
 */

// Import common test utilities
pub mod common;

// Import unit tests
mod unit {
    // Configuration loading and validation
    pub mod app_config_tests;

    // Sentence files and project layout
    pub mod file_utils_tests;

    // Transcript words to sentence lines
    pub mod sentences_tests;

    // Fragment splitting
    pub mod splitting_tests;

    // Token checks and timestamp projection
    pub mod alignment_tests;

    // Sentence translation with the mock provider
    pub mod translation_tests;
}

// Import integration tests
mod integration {
    // Split, align and emit through the controller
    pub mod subtitle_workflow_tests;

    // File translation through the controller
    pub mod translation_workflow_tests;
}
