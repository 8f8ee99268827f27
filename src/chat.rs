//! Console chat loop.
//!
//! Reads one line per turn, sends the whole conversation to the agent and
//! prints the reply with its wall-clock latency. The loop owns nothing: the
//! agent and the conversation are built by the caller and passed in.

use std::io::Write;
use std::time::Instant;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, error};

use crate::agent::Agent;
use crate::client::Client;
use crate::conversation::Conversation;

pub const PROMPT: &str = "User: ";
pub const EXIT_COMMAND: &str = "exit";
const SEPARATOR_WIDTH: usize = 120;

/// `exit` in any case, surrounded by any whitespace.
pub fn is_exit_command(input: &str) -> bool {
    input.trim().to_lowercase() == EXIT_COMMAND
}

/// Run turns until the user types `exit` or input ends.
///
/// A failed completion is logged and the loop moves on to the next turn.
/// Only console I/O errors end the loop early.
pub async fn run<C, R, W>(
    agent: &Agent<C>,
    conversation: &mut Conversation,
    mut input: R,
    output: &mut W,
) -> std::io::Result<()>
where
    C: Client,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut line = String::new();
    loop {
        write!(output, "{PROMPT}")?;
        output.flush()?;

        line.clear();
        if input.read_line(&mut line).await? == 0 {
            debug!("End of input, leaving chat loop");
            break;
        }

        let query = line.trim_end_matches(['\r', '\n']);
        if is_exit_command(query) {
            break;
        }

        turn(agent, conversation, query, output).await?;
    }
    Ok(())
}

async fn turn<C, W>(
    agent: &Agent<C>,
    conversation: &mut Conversation,
    query: &str,
    output: &mut W,
) -> std::io::Result<()>
where
    C: Client,
    W: Write,
{
    conversation.push_user(query);

    let start = Instant::now();
    match agent.chat(conversation.messages().to_vec()).await {
        Ok(response) => {
            let text = response.text().unwrap_or_default();
            writeln!(output, "Assistant: {text}")?;
            conversation.push_assistant(text);
        }
        Err(e) => {
            error!(
                conversation = conversation.id(),
                "Error during agent completion: {:?}", e
            );
        }
    }

    writeln!(
        output,
        "Response Time: {:.2} seconds",
        start.elapsed().as_secs_f64()
    )?;
    writeln!(output, "{}", "-".repeat(SEPARATOR_WIDTH))?;
    output.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ClientError;
    use crate::model::{FinishReason, Message, Response, Role};
    use crate::options::{ModelOptions, TransportOptions};
    use async_trait::async_trait;
    use rmcp::model::Tool;
    use std::sync::{Arc, Mutex};

    /// Replies "reply N" to the N-th request, failing when the user says "fail".
    #[derive(Clone, Default)]
    struct EchoClient {
        requests: Arc<Mutex<Vec<Vec<Message>>>>,
        model_options: ModelOptions<()>,
        transport_options: TransportOptions,
    }

    #[async_trait]
    impl Client for EchoClient {
        type ModelProvider = ();

        async fn request(
            &self,
            messages: Vec<Message>,
            _tools: Vec<Tool>,
        ) -> Result<Response, ClientError> {
            let last = messages.last().and_then(Message::content).unwrap_or_default();
            let mut requests = self.requests.lock().unwrap();
            requests.push(messages);
            if last == "fail" {
                return Err(ClientError::ProviderError("boom".to_string()));
            }
            Ok(Response {
                data: vec![Message::assistant(format!("reply {}", requests.len()))],
                usage: None,
                finish: FinishReason::Stop,
            })
        }

        fn model_options(&self) -> &ModelOptions<Self::ModelProvider> {
            &self.model_options
        }

        fn transport_options(&self) -> &TransportOptions {
            &self.transport_options
        }
    }

    async fn run_script(script: &str) -> (String, Conversation, EchoClient) {
        let client = EchoClient::default();
        let agent = Agent::new(client.clone());
        let mut conversation = Conversation::new("test");
        let mut output = Vec::new();

        run(&agent, &mut conversation, script.as_bytes(), &mut output)
            .await
            .unwrap();

        (String::from_utf8(output).unwrap(), conversation, client)
    }

    #[test]
    fn test_is_exit_command() {
        assert!(is_exit_command("exit"));
        assert!(is_exit_command("Exit"));
        assert!(is_exit_command(" exit "));
        assert!(is_exit_command("EXIT\t"));
        assert!(!is_exit_command("exit now"));
        assert!(!is_exit_command("quit"));
        assert!(!is_exit_command(""));
    }

    #[tokio::test]
    async fn test_exit_variants_stop_without_another_prompt() {
        for script in ["exit\nhello\n", "Exit\nhello\n", " exit \nhello\n"] {
            let (output, conversation, client) = run_script(script).await;
            assert_eq!(output, PROMPT);
            assert!(conversation.is_empty());
            assert!(client.requests.lock().unwrap().is_empty());
        }
    }

    #[tokio::test]
    async fn test_turns_append_user_and_assistant() {
        let (output, conversation, client) = run_script("hello\nhow are you?\nexit\n").await;

        assert_eq!(output.matches(PROMPT).count(), 3);
        assert!(output.contains("Assistant: reply 1\n"));
        assert!(output.contains("Assistant: reply 2\n"));
        assert_eq!(output.matches("Response Time: ").count(), 2);
        assert!(output.contains(&"-".repeat(120)));

        let roles: Vec<Role> = conversation.messages().iter().map(Message::role).collect();
        assert_eq!(
            roles,
            vec![Role::User, Role::Assistant, Role::User, Role::Assistant]
        );

        // second request carries the first reply
        let requests = client.requests.lock().unwrap();
        assert_eq!(requests[1].len(), 3);
        assert_eq!(requests[1][1].content().as_deref(), Some("reply 1"));
    }

    #[tokio::test]
    async fn test_failed_turn_keeps_looping() {
        let (output, conversation, _) = run_script("fail\nagain\n").await;

        // no assistant line for the failed turn, but timing is still reported
        assert_eq!(output.matches("Assistant: ").count(), 1);
        assert_eq!(output.matches("Response Time: ").count(), 2);
        assert_eq!(conversation.len(), 3);
        assert_eq!(conversation.messages()[0].content().as_deref(), Some("fail"));
    }

    #[tokio::test]
    async fn test_end_of_input_terminates() {
        let (output, conversation, _) = run_script("only line").await;
        assert_eq!(output.matches(PROMPT).count(), 2);
        assert_eq!(conversation.len(), 2);
    }
}
