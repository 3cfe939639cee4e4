/// Values supplied for `trending`, in request order.
#[derive(Debug, Default)]
pub struct TrendingParams {
    values: Vec<String>,
}

impl TrendingParams {
    pub fn from_query_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Self {
            values: pairs
                .into_iter()
                .filter(|(key, _)| key == "trending")
                .map(|(_, value)| value)
                .collect(),
        }
    }

    /// Presence test, not a boolean parse: any non-empty value (including
    /// `false`) or a repeated key selects trending listings; absent or a
    /// single empty value selects the rest.
    pub fn is_trending(&self) -> bool {
        match self.values.as_slice() {
            [] => false,
            [value] => !value.is_empty(),
            _ => true,
        }
    }
}
