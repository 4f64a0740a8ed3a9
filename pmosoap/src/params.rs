//! Paramètres et description d'un appel d'opération

/// Ordered mapping of parameter name to value.
///
/// The insertion order is the order of the child elements in the envelope.
/// Inserting an existing name replaces its value without moving it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    entries: Vec<(String, String)>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a parameter, returning the previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == name) {
            Some((_, v)) => Some(std::mem::replace(v, value)),
            None => {
                self.entries.push((name, value));
                None
            }
        }
    }

    /// Builder-style [`Params::insert`].
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Params::new();
        for (k, v) in iter {
            params.insert(k, v);
        }
        params
    }
}

impl<K: Into<String>, V: Into<String>, const N: usize> From<[(K, V); N]> for Params {
    fn from(entries: [(K, V); N]) -> Self {
        entries.into_iter().collect()
    }
}

/// One invocation: operation name, envelope title and parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationCall {
    operation: String,
    title: String,
    params: Params,
}

impl OperationCall {
    pub fn new(operation: impl Into<String>, title: impl Into<String>, params: Params) -> Self {
        Self {
            operation: operation.into(),
            title: title.into(),
            params,
        }
    }

    /// Operation name, used for the `SOAPAction` header.
    pub fn operation(&self) -> &str {
        &self.operation
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Name of the wrapper element in the body: the title, or the operation
    /// name when no title was given.
    pub fn element_name(&self) -> &str {
        if self.title.is_empty() {
            &self.operation
        } else {
            &self.title
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insertion_order_is_kept() {
        let params = Params::new()
            .with("zeta", "1")
            .with("alpha", "2")
            .with("mid", "3");

        let names: Vec<&str> = params.iter().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_replace_keeps_position() {
        let mut params = Params::from([("name", "AOK"), ("password", "")]);
        let previous = params.insert("name", "ZZZ");

        assert_eq!(previous, Some("AOK".to_string()));
        assert_eq!(params.len(), 2);
        assert_eq!(params.iter().next(), Some(("name", "ZZZ")));
    }

    #[test]
    fn test_element_name_falls_back_to_operation() {
        let call = OperationCall::new("Execute", "", Params::new());
        assert_eq!(call.element_name(), "Execute");

        let call = OperationCall::new(
            "SecurityProviderAuthenticate",
            "SecurityProviderAuthenticateRequest",
            Params::new(),
        );
        assert_eq!(call.element_name(), "SecurityProviderAuthenticateRequest");
        assert_eq!(call.operation(), "SecurityProviderAuthenticate");
    }
}
