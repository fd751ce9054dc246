//! Tantivy schema for article documents.
//!
//! One document per article, keyed by the raw-tokenized `id` field so
//! upserts and removes can delete by exact term. Title, content and tags
//! go through the default tokenizer (lowercased terms), which also splits
//! the comma-joined tags string into individual tag tokens.

use tantivy::schema::{
    Field, IndexRecordOption, Schema, TextFieldIndexing, TextOptions, STORED,
};

/// Schema plus the field handles queries need.
#[derive(Clone)]
pub struct ArticleFields {
    pub schema: Schema,
    pub id: Field,
    pub title: Field,
    pub content: Field,
    pub tags: Field,
}

impl ArticleFields {
    pub fn build() -> Self {
        let mut schema_builder = Schema::builder();

        // Exact matching only; never tokenized.
        let id = schema_builder.add_text_field(
            "id",
            TextOptions::default()
                .set_indexing_options(
                    TextFieldIndexing::default()
                        .set_tokenizer("raw")
                        .set_index_option(IndexRecordOption::Basic),
                )
                .set_stored(),
        );

        let title = schema_builder.add_text_field("title", tantivy::schema::TEXT | STORED);
        let content = schema_builder.add_text_field("content", tantivy::schema::TEXT | STORED);
        // Comma-joined at index time, split back into a list on read.
        let tags = schema_builder.add_text_field("tags", tantivy::schema::TEXT | STORED);

        Self {
            schema: schema_builder.build(),
            id,
            title,
            content,
            tags,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_has_all_fields() {
        let fields = ArticleFields::build();
        assert_eq!(fields.schema.get_field_name(fields.id), "id");
        assert_eq!(fields.schema.get_field_name(fields.title), "title");
        assert_eq!(fields.schema.get_field_name(fields.content), "content");
        assert_eq!(fields.schema.get_field_name(fields.tags), "tags");
    }
}
