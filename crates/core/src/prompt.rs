/// Assembles the completion prompt from the retrieved knowledge-base chunks
/// and optional web augmentation. Chunks are separated by `---` lines; the
/// retriever guarantees at least one line, so the context section is never
/// empty.
pub fn build_prompt(query: &str, context_chunks: &[String], web_context: Option<&str>) -> String {
    let context = context_chunks.join("\n---\n");
    let web_section = web_context
        .map(|text| format!("\n{text}\n"))
        .unwrap_or_default();

    format!(
        "You are an expert Indian banking assistant. Use the context below to answer the \
         user's question.\n\
         \n\
         Instructions:\n\
         - If web search results are provided, treat them as the primary, most current source.\n\
         - Combine web search results with knowledge base context when relevant.\n\
         - Cite the source when using web search results.\n\
         \n\
         ---\n\
         Knowledge Base Context:\n\
         {context}\n\
         {web_section}\
         ---\n\
         \n\
         Question: {query}\n"
    )
}

/// Formats augmentation text under its route heading, the shape
/// [`build_prompt`] expects for `web_context`.
pub fn format_web_section(heading: &str, text: &str) -> String {
    format!("{heading}:\n{text}")
}
