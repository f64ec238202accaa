/// Row to insert for a newly created document.
#[derive(Debug, Clone)]
pub struct DocumentCreate {
    pub path: String,
    pub parent: String,
    pub collection_id: String,
    pub body: String,
}

impl DocumentCreate {
    pub fn new(
        path: impl Into<String>,
        parent: impl Into<String>,
        collection_id: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            parent: parent.into(),
            collection_id: collection_id.into(),
            body: body.into(),
        }
    }
}
