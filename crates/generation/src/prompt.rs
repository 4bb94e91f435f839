/// Render the answer prompt around the retrieved context and the user question.
pub fn render_prompt(context: &str, query: &str) -> String {
    format!(
        "Here are few data for the context to answer question that are asked later\n\
         {context}\n\n\n\
         based on the above the context answer below question:\n\
         {query}\n"
    )
}
