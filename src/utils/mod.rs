pub mod matching;

pub use matching::{find_matching_file, normalize_candidate, parse_service_list};
