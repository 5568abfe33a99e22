//! Custom assertion macros

/// Assert that a result is ok and return the value
#[macro_export]
macro_rules! assert_ok {
    ($result:expr) => {
        match $result {
            Ok(value) => value,
            Err(e) => panic!("Expected Ok, got Err: {:?}", e),
        }
    };
    ($result:expr, $message:expr) => {
        match $result {
            Ok(value) => value,
            Err(e) => panic!("{}: {:?}", $message, e),
        }
    };
}

/// Assert that two quote collections hold the same (id, text, category)
/// triples in the same order, ignoring timestamps
#[macro_export]
macro_rules! assert_same_quotes {
    ($left:expr, $right:expr) => {{
        let strip = |quotes: &[quote_sync::shared::QuoteRecord]| {
            quotes
                .iter()
                .map(|q| (q.id.clone(), q.text.clone(), q.category.clone()))
                .collect::<Vec<_>>()
        };
        pretty_assertions::assert_eq!(strip(&$left[..]), strip(&$right[..]));
    }};
}
