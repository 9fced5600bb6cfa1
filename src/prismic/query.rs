//! Search query builder

/// A search predicate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// `path` equals `value`
    At(String, String),
}

impl Predicate {
    fn render(&self) -> String {
        match self {
            Predicate::At(path, value) => format!("[at({},{})]", path, quote(value)),
        }
    }
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Parameters of a `documents/search` request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pub predicates: Vec<Predicate>,
    pub page_size: Option<usize>,
    pub fetch: Vec<String>,
    pub orderings: Vec<String>,
    /// Content ref; the master ref is used when unset
    pub reference: Option<String>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Documents of one custom type
    pub fn of_type(doc_type: &str) -> Self {
        Self::new().at("document.type", doc_type)
    }

    pub fn at(mut self, path: &str, value: &str) -> Self {
        self.predicates
            .push(Predicate::At(path.to_string(), value.to_string()));
        self
    }

    pub fn page_size(mut self, size: usize) -> Self {
        self.page_size = Some(size);
        self
    }

    pub fn fetch<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fetch.extend(fields.into_iter().map(Into::into));
        self
    }

    pub fn order_by(mut self, field: &str) -> Self {
        self.orderings.push(field.to_string());
        self
    }

    pub fn with_ref(mut self, reference: Option<&str>) -> Self {
        self.reference = reference.map(str::to_string);
        self
    }

    /// The `q` parameter
    pub fn q(&self) -> String {
        let inner: String = self.predicates.iter().map(Predicate::render).collect();
        format!("[{}]", inner)
    }

    /// Query parameters other than `ref` and `access_token`
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("q", self.q())];
        if let Some(size) = self.page_size {
            params.push(("pageSize", size.to_string()));
        }
        if !self.fetch.is_empty() {
            params.push(("fetch", self.fetch.join(",")));
        }
        if !self.orderings.is_empty() {
            params.push(("orderings", format!("[{}]", self.orderings.join(","))));
        }
        params
    }
}
