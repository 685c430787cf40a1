//! WebSocket client session management.

use futures_util::{SinkExt, StreamExt, stream::SplitSink};
use rustyline::{DefaultEditor, error::ReadlineError};
use tokio::{net::TcpStream, sync::mpsc};
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async, tungstenite::protocol::Message,
};

use classpoll_server::infrastructure::dto::{
    encode_event,
    websocket::{EventName, LiveAnswerUpdatePayload, WireId, WireTimestamp},
};
use classpoll_shared::time::get_timestamp_millis;

use super::{error::ClientError, formatter::MessageFormatter, ui::redisplay_prompt};

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;

/// Who is answering, for `live_answer_update` payloads
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentIdentity {
    pub student_id: i64,
    pub student_name: String,
    pub quiz_id: i64,
    /// Also address the professor's personal room
    pub professor_id: Option<i64>,
}

/// Rooms to join after connecting, and whether answers are read from stdin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionPlan {
    pub joins: Vec<(EventName, i64)>,
    pub student: Option<StudentIdentity>,
}

impl SessionPlan {
    /// Watch rooms without sending anything (professor dashboard)
    pub fn watcher(quiz_id: Option<i64>, professor_id: Option<i64>, user_id: Option<i64>) -> Self {
        let joins = [
            (EventName::JoinQuizRoom, quiz_id),
            (EventName::JoinProfessorRoom, professor_id),
            (EventName::JoinUserRoom, user_id),
        ]
        .into_iter()
        .filter_map(|(event, id)| id.map(|id| (event, id)))
        .collect();
        Self {
            joins,
            student: None,
        }
    }

    /// Join the quiz and the student's own room, then send answers typed at the prompt
    pub fn student(identity: StudentIdentity) -> Self {
        Self {
            joins: vec![
                (EventName::JoinQuizRoom, identity.quiz_id),
                (EventName::JoinUserRoom, identity.student_id),
            ],
            student: Some(identity),
        }
    }
}

/// Parse a prompt line: `<questionId> <optionId> [option text]`
pub fn parse_answer_line(line: &str) -> Result<(i64, i64, String), ClientError> {
    let invalid = || {
        ClientError::InvalidInput(format!(
            "expected '<questionId> <optionId> [option text]', got '{}'",
            line
        ))
    };
    let mut parts = line.split_whitespace();
    let question_id = parts
        .next()
        .and_then(|p| p.parse().ok())
        .ok_or_else(invalid)?;
    let option_id = parts
        .next()
        .and_then(|p| p.parse().ok())
        .ok_or_else(invalid)?;
    let option_text = parts.collect::<Vec<_>>().join(" ");
    Ok((question_id, option_id, option_text))
}

/// Build the `live_answer_update` data for one answer
pub fn build_live_answer(
    student: &StudentIdentity,
    question_id: i64,
    option_id: i64,
    option_text: String,
    timestamp: i64,
) -> LiveAnswerUpdatePayload {
    LiveAnswerUpdatePayload {
        student_id: WireId::from(student.student_id),
        student_name: student.student_name.clone(),
        quiz_id: WireId::from(student.quiz_id),
        question_id: WireId::from(question_id),
        selected_option_id: WireId::from(option_id),
        option_text,
        timestamp: WireTimestamp::Millis(timestamp),
        professor_id: student.professor_id.map(WireId::from),
    }
}

/// Run the WebSocket client session
pub async fn run_client_session(
    url: &str,
    plan: &SessionPlan,
) -> Result<(), Box<dyn std::error::Error>> {
    let (ws_stream, _response) = connect_async(url)
        .await
        .map_err(|e| ClientError::ConnectionError(e.to_string()))?;

    tracing::info!("Connected to relay server!");

    let (mut write, mut read) = ws_stream.split();

    for (event, id) in &plan.joins {
        let frame = encode_event(*event, id)?;
        write
            .send(Message::Text(frame.into()))
            .await
            .map_err(|e| ClientError::ConnectionError(e.to_string()))?;
    }

    let prompt = match &plan.student {
        Some(student) => student.student_name.clone(),
        None => "watch".to_string(),
    };

    // Spawn a task to handle incoming messages
    let prompt_for_read = prompt.clone();
    let mut read_task = tokio::spawn(async move {
        let mut connection_error = false;

        while let Some(message) = read.next().await {
            match message {
                Ok(Message::Text(text)) => {
                    print!("{}", MessageFormatter::format_frame(text.as_str()));
                    redisplay_prompt(&prompt_for_read);
                }
                Ok(Message::Binary(data)) => {
                    print!("{}", MessageFormatter::format_binary_message(data.len()));
                    redisplay_prompt(&prompt_for_read);
                }
                Ok(Message::Close(_)) => {
                    tracing::info!("Server closed the connection");
                    connection_error = true;
                    break;
                }
                Err(e) => {
                    tracing::warn!("WebSocket read error: {}", e);
                    connection_error = true;
                    break;
                }
                _ => {}
            }
        }

        connection_error
    });

    let mut write_task = match plan.student.clone() {
        Some(student) => {
            println!(
                "\nYou are '{}'. Type '<questionId> <optionId> [option text]' and press Enter. \
                 Press Ctrl+C to exit.\n",
                student.student_name
            );
            answer_loop(write, student, prompt)
        }
        None => {
            println!("\nWatching. Press Ctrl+C to exit.\n");
            tokio::spawn(async move {
                let _write = write;
                if let Err(e) = tokio::signal::ctrl_c().await {
                    tracing::error!("Failed to listen for Ctrl+C: {}", e);
                }
                false
            })
        }
    };

    // If any one of the tasks completes, abort the other
    tokio::select! {
        read_result = &mut read_task => {
            write_task.abort();
            if read_result.unwrap_or(false) {
                return Err(Box::new(ClientError::ConnectionError(
                    "Connection lost".to_string(),
                )));
            }
        }
        write_result = &mut write_task => {
            read_task.abort();
            if write_result.unwrap_or(false) {
                return Err(Box::new(ClientError::ConnectionError(
                    "Connection lost".to_string(),
                )));
            }
        }
    }

    Ok(())
}

/// Read answers from a readline thread and send them as `live_answer_update`.
///
/// Resolves to `true` when the socket failed.
fn answer_loop(
    mut write: WsSink,
    student: StudentIdentity,
    prompt: String,
) -> tokio::task::JoinHandle<bool> {
    let (input_tx, mut input_rx) = mpsc::unbounded_channel::<String>();

    // rustyline is synchronous
    let prompt_for_readline = format!("{}> ", prompt);
    std::thread::spawn(move || {
        let mut rl = match DefaultEditor::new() {
            Ok(rl) => rl,
            Err(e) => {
                eprintln!("Failed to initialize readline: {}", e);
                return;
            }
        };

        loop {
            match rl.readline(&prompt_for_readline) {
                Ok(line) => {
                    let line = line.trim();
                    if !line.is_empty() {
                        rl.add_history_entry(line).ok();
                        if input_tx.send(line.to_string()).is_err() {
                            break;
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    tracing::info!("Interrupted");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    tracing::info!("EOF");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {}", err);
                    break;
                }
            }
        }
    });

    tokio::spawn(async move {
        while let Some(line) = input_rx.recv().await {
            let (question_id, option_id, option_text) = match parse_answer_line(&line) {
                Ok(answer) => answer,
                Err(e) => {
                    println!("{}", e);
                    redisplay_prompt(&prompt);
                    continue;
                }
            };

            let sent_at = get_timestamp_millis();
            let payload = build_live_answer(&student, question_id, option_id, option_text, sent_at);
            let frame = match encode_event(EventName::LiveAnswerUpdate, &payload) {
                Ok(frame) => frame,
                Err(e) => {
                    tracing::error!("Failed to serialize answer: {}", e);
                    continue;
                }
            };

            if let Err(e) = write.send(Message::Text(frame.into())).await {
                tracing::warn!("Failed to send answer: {}", e);
                return true;
            }

            print!("\n{}", MessageFormatter::format_sent_confirmation(sent_at));
            redisplay_prompt(&prompt);
        }

        false
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hana() -> StudentIdentity {
        StudentIdentity {
            student_id: 15,
            student_name: "Hana".to_string(),
            quiz_id: 7,
            professor_id: Some(2),
        }
    }

    #[test]
    fn test_parse_answer_line() {
        // テスト項目: 設問 ID・選択肢 ID・選択肢テキストが解析される
        // given (前提条件):
        let line = "3 9 Mitochondria and more";

        // when (操作):
        let result = parse_answer_line(line);

        // then (期待する結果):
        assert_eq!(
            result.unwrap(),
            (3, 9, "Mitochondria and more".to_string())
        );
    }

    #[test]
    fn test_parse_answer_line_rejects_missing_option() {
        // テスト項目: 選択肢 ID がない行はエラー
        // given (前提条件):
        let line = "3";

        // when (操作):
        let result = parse_answer_line(line);

        // then (期待する結果):
        assert!(matches!(result, Err(ClientError::InvalidInput(_))));
    }

    #[test]
    fn test_student_plan_joins_quiz_and_user_rooms() {
        // テスト項目: 学生モードではクイズルームと自分のユーザールームに参加する
        // given (前提条件):
        let identity = hana();

        // when (操作):
        let plan = SessionPlan::student(identity.clone());

        // then (期待する結果):
        assert_eq!(
            plan.joins,
            vec![(EventName::JoinQuizRoom, 7), (EventName::JoinUserRoom, 15)]
        );
        assert_eq!(plan.student, Some(identity));
    }

    #[test]
    fn test_watcher_plan_skips_missing_rooms() {
        // テスト項目: 指定されたルームだけに参加する
        // given (前提条件):
        let quiz_id = Some(7);

        // when (操作):
        let plan = SessionPlan::watcher(quiz_id, None, None);

        // then (期待する結果):
        assert_eq!(plan.joins, vec![(EventName::JoinQuizRoom, 7)]);
        assert!(plan.student.is_none());
    }

    #[test]
    fn test_build_live_answer_payload() {
        // テスト項目: 回答ペイロードが camelCase の JSON になり、教員 ID を含む
        // given (前提条件):
        let identity = hana();

        // when (操作):
        let payload = build_live_answer(&identity, 3, 9, "Mitochondria".to_string(), 1000);
        let json = serde_json::to_value(&payload).unwrap();

        // then (期待する結果):
        assert_eq!(
            json,
            serde_json::json!({
                "studentId": 15,
                "studentName": "Hana",
                "quizId": 7,
                "questionId": 3,
                "selectedOptionId": 9,
                "optionText": "Mitochondria",
                "timestamp": 1000,
                "professorId": 2
            })
        );
    }
}
