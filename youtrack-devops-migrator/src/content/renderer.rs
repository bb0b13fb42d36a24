//! Handlebars registry for provenance preambles.

use handlebars::{no_escape, Handlebars};

/// Creates a configured Handlebars registry.
///
/// The registry is configured with:
/// - No HTML escaping (preambles already contain markup)
/// - Strict mode (catches misspelled variables)
#[must_use]
pub fn create_handlebars_registry() -> Handlebars<'static> {
    let mut hbs = Handlebars::new();

    // Disable HTML escaping; the destination renders the output as HTML
    hbs.register_escape_fn(no_escape);

    // Enable strict mode to catch missing variables
    hbs.set_strict_mode(true);

    hbs
}
