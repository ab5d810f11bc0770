use std::collections::BTreeMap;

/// Normalizes a header name: the first letter of every run of alphabetic
/// characters is upper-cased and the rest of the run lower-cased. Anything
/// else (hyphens, digits) is copied as is and ends the current run.
pub fn title_case(name: &str) -> String {
    let mut result = String::with_capacity(name.len());
    let mut in_word = false;
    for c in name.chars() {
        if !c.is_alphabetic() {
            result.push(c);
            in_word = false;
            continue;
        }
        let mapped: Vec<char> = if in_word {
            c.to_lowercase().collect()
        } else {
            // only the first char of a multi-char upper-case mapping stays upper
            let mut upper = c.to_uppercase();
            upper.next().into_iter().chain(upper.flat_map(char::to_lowercase)).collect()
        };
        for m in mapped {
            result.push(m);
            in_word = m.is_alphabetic();
        }
    }
    result
}

/// Header section of a message, one value per name.
///
/// Names are kept exactly as inserted. The codec title-cases names before
/// inserting them, so parsed messages only ever hold normalized names.
/// Iteration is ordered by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers(BTreeMap<String, String>);

impl Headers {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Sets `name` to `value`, returning the value it replaced.
    pub fn insert<N: Into<String>, V: Into<String>>(&mut self, name: N, value: V) -> Option<String> {
        self.0.insert(name.into(), value.into())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for Headers {
    fn from_iter<T: IntoIterator<Item = (N, V)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(n, v)| (n.into(), v.into())).collect())
    }
}

impl<N: Into<String>, V: Into<String>, const L: usize> From<[(N, V); L]> for Headers {
    fn from(pairs: [(N, V); L]) -> Self {
        pairs.into_iter().collect()
    }
}
