/// In-place parameter removal.
pub mod edit;
/// Parameter access for `name[params]` keys.
pub mod key;
/// Parameter-list tokenizer: one lazy stream of decoded tokens.
pub mod lexer;
/// Count, measure, extract and split over a parameter list.
pub mod params;
/// Quoting helpers for rewrite callbacks.
pub mod quote;
