//! System and user prompt builders

use chrono::Local;

use crate::config::Agent;

/// Context gathered alongside the spoken request
#[derive(Debug, Clone, Default)]
pub struct PromptContext {
    /// Text selected in the focused application when the request was made
    pub selected_text: String,
    /// Screenshot as a data URL
    pub image_data_url: Option<String>,
}

/// Core instructions shared by every general generation
pub fn base_prompt() -> &'static str {
    "# SYSTEM_CORE
Role: Desktop Assistant & Text Processor.

# IMMUTABLE_RULES
1. NO FILLER: Ban phrases like \"As an AI\", \"Sure\", \"Here is the text\".
2. EDITING: If user asks to modify text, output ONLY the result.
3. LANGUAGE: Detect user input language and match it 100%.
4. FORMAT: Markdown.
"
}

fn today() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}

/// System prompt for the general assistant.
pub fn general_system_prompt(context: &PromptContext, web_capable: bool) -> String {
    let mut prompt = base_prompt().to_string();

    if web_capable {
        prompt.push_str("\n# CAPABILITIES\n- Web Search: Enabled (Cite sources).\n- Code: Enabled.");
    }

    prompt.push_str(&format!("\n# CURRENT_CONTEXT\nDate: {}.\n", today()));

    if context.image_data_url.is_some() {
        prompt.push_str("[Input contains Image Data]\n");
    }

    if context.selected_text.is_empty() {
        prompt.push_str("Mode: General Knowledge / Chat.");
    } else {
        prompt.push_str(&format!(
            "\n<selected_content_to_process>\n{}\n</selected_content_to_process>\nInstruction: Apply user request to the content above.\n",
            context.selected_text
        ));
    }

    prompt
}

/// System prompt for web-search generations.
pub fn web_system_prompt(context: &PromptContext) -> String {
    let mut prompt = format!(
        "# SYSTEM_CORE
Role: Research Assistant with live web access.
Date: {}.

# RULES
1. Search the web for current information before answering.
2. Cite sources inline as Markdown links.
3. Be concise. No filler.
4. LANGUAGE: Match the user's language.
",
        today()
    );

    if !context.selected_text.is_empty() {
        prompt.push_str(&format!(
            "\n<selected_content_to_process>\n{}\n</selected_content_to_process>\n",
            context.selected_text
        ));
    }

    prompt
}

/// System prompt for screen-vision generations.
pub fn vision_system_prompt(context: &PromptContext) -> String {
    let mut prompt = format!(
        "# SYSTEM_CORE
Role: Screen Analysis Assistant.
Date: {}.

# RULES
1. The attached image is the user's current screen.
2. Answer the user's request about what is visible.
3. Be concise. No filler.
4. LANGUAGE: Match the user's language.
",
        today()
    );

    if !context.selected_text.is_empty() {
        prompt.push_str(&format!(
            "\n<selected_text>\n{}\n</selected_text>\n",
            context.selected_text
        ));
    }

    prompt
}

/// System prompt for a user-defined agent.
pub fn agent_system_prompt(agent: &Agent) -> String {
    format!(
        "# AGENT_CORE
Role: {} (Specialized AI).
Output_Mode: Direct Execution.

# FORMATTING
- Markdown enabled.
- Math: Inline `$E=mc^2$`, Block `$$ ... $$`.

# USER_DEFINED_INSTRUCTIONS
{}

# GLOBAL_CONSTRAINTS
- Language: Match user input.
- No conversational filler.
",
        agent.name, agent.prompt
    )
}

/// User turn recorded in history for an agent run.
pub fn agent_user_prompt(instruction: &str, context: &PromptContext) -> String {
    let mut prompt = format!("<user_instruction>\n{}\n</user_instruction>\n\n", instruction);

    if !context.selected_text.is_empty() {
        prompt.push_str(&format!(
            "<selected_text>\n{}\n</selected_text>\n\n",
            context.selected_text
        ));
    }

    prompt.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_prompts() {
        let agent = Agent::new("Notes", "note").with_prompt("Write terse notes.");
        let system = agent_system_prompt(&agent);
        assert!(system.contains("Role: Notes (Specialized AI)."));
        assert!(system.contains("Write terse notes."));

        let context = PromptContext {
            selected_text: "milk, eggs".to_string(),
            image_data_url: None,
        };
        assert_eq!(
            agent_user_prompt("buy milk", &context),
            "<user_instruction>\nbuy milk\n</user_instruction>\n\n<selected_text>\nmilk, eggs\n</selected_text>"
        );
        assert_eq!(
            agent_user_prompt("buy milk", &PromptContext::default()),
            "<user_instruction>\nbuy milk\n</user_instruction>"
        );
    }

    #[test]
    fn test_general_prompt_modes() {
        let chat = general_system_prompt(&PromptContext::default(), false);
        assert!(chat.starts_with(base_prompt()));
        assert!(chat.ends_with("Mode: General Knowledge / Chat."));
        assert!(!chat.contains("CAPABILITIES"));

        let context = PromptContext {
            selected_text: "fix my grammer".to_string(),
            image_data_url: Some("data:image/png;base64,AA".to_string()),
        };
        let edit = general_system_prompt(&context, true);
        assert!(edit.contains("Web Search: Enabled"));
        assert!(edit.contains("[Input contains Image Data]"));
        assert!(edit.contains("<selected_content_to_process>\nfix my grammer\n"));
    }
}
