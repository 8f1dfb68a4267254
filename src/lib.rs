// Library root
// -----------
// This crate exposes a small library surface for the CLI. The binary
// (`main.rs`) uses these modules to implement the sticky command.
//
// Module responsibilities:
// - `api`: Encapsulates HTTP interactions with the Sticky Notes service
//   (parameter listing, paste listing, paste details, creation) and the
//   response-envelope and expiration logic.
// - `ui`: Implements the user-facing operation flows and renders the
//   service's responses as terminal output, delegating requests to `api`.
//
// Keeping this separation makes the response handling and request
// assembly testable without a running service.
pub mod api;
pub mod ui;
