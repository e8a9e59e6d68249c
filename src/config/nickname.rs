//! Default nickname for configurations that do not set one.
//!
//! Nicknames look like `LunarOwl42`: an adjective, a noun and a two digit
//! suffix.

use rand::RngExt;

const ADJECTIVES: &[&str] = &[
    "Amber", "Brisk", "Calm", "Dusty", "Eager", "Fuzzy", "Gentle", "Hazy", "Icy", "Jolly", "Keen",
    "Lunar", "Mellow", "Nimble", "Odd", "Plucky", "Quiet", "Rusty", "Sunny", "Tidy", "Umber",
    "Vivid", "Witty", "Zesty",
];

const NOUNS: &[&str] = &[
    "Ant", "Bee", "Cat", "Doe", "Eel", "Finch", "Gnu", "Hare", "Ibis", "Jay", "Kiwi", "Lark",
    "Mole", "Newt", "Owl", "Pika", "Quail", "Rook", "Seal", "Toad", "Vole", "Wren", "Yak",
];

pub fn generate_nickname() -> String {
    let mut rng = rand::rng();
    let adjective = ADJECTIVES[rng.random_range(0..ADJECTIVES.len())];
    let noun = NOUNS[rng.random_range(0..NOUNS.len())];
    let suffix: u8 = rng.random_range(0..100);
    format!("{}{}{:02}", adjective, noun, suffix)
}
