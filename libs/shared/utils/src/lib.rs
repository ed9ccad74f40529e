pub mod extractor;
pub mod jwt;
pub mod slug;
pub mod test_utils;
pub mod time;
