use super::*;

use focus_protocols::RelevancePayload;
use tokio::sync::mpsc;
use tokio::time::Instant;

/// Stand-in for the relay: answers `forwardToBackground` posts with
/// `answer(action)` and reports every post the agent makes as `AiScript`.
fn fake_relay<F>(bus: &WindowBus, answer: F) -> mpsc::UnboundedReceiver<WindowAction>
where
    F: Fn(&HubAction) -> Option<WindowAction> + Send + 'static,
{
    let mut port = bus.port(FrameId::Top);
    let to_agent = bus.sender(FrameId::Top, FrameId::Top);
    let (seen_tx, seen_rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        while let Some(post) = port.recv().await {
            let Ok(envelope) = WindowEnvelope::from_wire(&post.data) else {
                continue;
            };
            if envelope.source != Source::AiScript {
                continue;
            }
            if let WindowAction::ForwardToBackground { payload } = &envelope.action {
                if let Some(reply) = answer(payload) {
                    to_agent
                        .post(&WindowEnvelope::new(Source::ContentScript, reply))
                        .unwrap();
                }
            }
            let _ = seen_tx.send(envelope.action);
        }
    });
    seen_rx
}

fn start_agent(bus: &WindowBus) -> PageAgent {
    let agent = PageAgent::new(bus, AgentTimeouts::default());
    agent.clone().spawn(bus.port(FrameId::Top));
    agent
}

fn relevance_answer(
    text: &'static str,
) -> impl Fn(&HubAction) -> Option<WindowAction> + Send + 'static {
    move |action| match action {
        HubAction::PerformRelevanceCheck { request_id, .. } => {
            Some(WindowAction::RelevanceResponse {
                request_id: request_id.clone(),
                response: text.to_string(),
            })
        }
        _ => None,
    }
}

#[tokio::test(start_paused = true)]
async fn test_relevance_answered() {
    let bus = WindowBus::default();
    let _seen = fake_relay(&bus, relevance_answer("YES"));
    let agent = start_agent(&bus);

    let verdict = agent.check_relevance("learn Spanish", "Spanish verbs").await;
    assert_eq!(verdict, Relevance::Yes);
    assert_eq!(agent.pending(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_unrecognized_answer_is_no() {
    let bus = WindowBus::default();
    let _seen = fake_relay(&bus, relevance_answer("Yes, definitely"));
    let agent = start_agent(&bus);

    let verdict = agent.check_relevance("learn Spanish", "Spanish verbs").await;
    assert_eq!(verdict, Relevance::No);
}

#[tokio::test(start_paused = true)]
async fn test_relevance_times_out_to_no() {
    let bus = WindowBus::default();
    let _seen = fake_relay(&bus, |_| None);
    let agent = start_agent(&bus);

    let started = Instant::now();
    let verdict = agent.check_relevance("learn Spanish", "cat videos").await;
    assert_eq!(verdict, Relevance::No);
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_millis(5000), "{:?}", elapsed);
    assert!(elapsed < Duration::from_millis(5100), "{:?}", elapsed);
    assert_eq!(agent.pending(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_completion_times_out_to_none() {
    let bus = WindowBus::default();
    let _seen = fake_relay(&bus, |_| None);
    let agent = start_agent(&bus);

    let started = Instant::now();
    assert_eq!(agent.get_completion("hello").await, None);
    assert!(started.elapsed() >= Duration::from_millis(10_000));
}

#[tokio::test(start_paused = true)]
async fn test_completion_answered() {
    let bus = WindowBus::default();
    let _seen = fake_relay(&bus, |action| match action {
        HubAction::PerformAiResponse { request_id, prompt } => Some(WindowAction::AiResponse {
            request_id: request_id.clone(),
            response: Some(format!("echo: {}", prompt)),
        }),
        _ => None,
    });
    let agent = start_agent(&bus);

    let reply = agent.get_completion("hello").await;
    assert_eq!(reply.as_deref(), Some("echo: hello"));
}

#[tokio::test(start_paused = true)]
async fn test_late_response_is_dropped() {
    let bus = WindowBus::default();
    let mut seen = fake_relay(&bus, |_| None);
    let agent = start_agent(&bus);

    assert_eq!(agent.check_relevance("g", "t").await, Relevance::No);
    let request_id = match seen.recv().await {
        Some(WindowAction::ForwardToBackground {
            payload: HubAction::PerformRelevanceCheck { request_id, .. },
        }) => request_id,
        other => panic!("unexpected post {:?}", other),
    };

    bus.sender(FrameId::Top, FrameId::Top)
        .post(&WindowEnvelope::new(
            Source::ContentScript,
            WindowAction::RelevanceResponse {
                request_id,
                response: "YES".to_string(),
            },
        ))
        .unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(agent.pending(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_answers_from_other_frames_are_ignored() {
    let bus = WindowBus::default();
    let mut seen = fake_relay(&bus, |_| None);
    let agent = start_agent(&bus);

    let check = {
        let agent = agent.clone();
        tokio::spawn(async move { agent.check_relevance("g", "t").await })
    };
    let request_id = match seen.recv().await {
        Some(WindowAction::ForwardToBackground {
            payload: HubAction::PerformRelevanceCheck { request_id, .. },
        }) => request_id,
        other => panic!("unexpected post {:?}", other),
    };

    // A third-party iframe replaying the id cannot resolve the request.
    bus.sender(FrameId::Foreign(7), FrameId::Top)
        .post(&WindowEnvelope::new(
            Source::ContentScript,
            WindowAction::RelevanceResponse {
                request_id,
                response: "YES".to_string(),
            },
        ))
        .unwrap();

    assert_eq!(check.await.unwrap(), Relevance::No);
}

#[tokio::test(start_paused = true)]
async fn test_serves_relay_check_under_the_same_id() {
    let bus = WindowBus::default();
    let mut seen = fake_relay(&bus, relevance_answer("YES"));
    let _agent = start_agent(&bus);

    bus.sender(FrameId::Top, FrameId::Top)
        .post(&WindowEnvelope::new(
            Source::ContentScript,
            WindowAction::CheckRelevance {
                payload: RelevancePayload {
                    user_goal: "learn Spanish".to_string(),
                    page_text: "Spanish verbs".to_string(),
                    request_id: RequestId::from("fp-req-42"),
                },
            },
        ))
        .unwrap();

    match seen.recv().await {
        Some(WindowAction::ForwardToBackground {
            payload: HubAction::PerformRelevanceCheck { request_id, prompt },
        }) => {
            assert_eq!(request_id.as_str(), "fp-req-42");
            assert!(prompt.contains("User Goal: learn Spanish"));
        }
        other => panic!("unexpected post {:?}", other),
    }
    match seen.recv().await {
        Some(WindowAction::RelevanceResponse {
            request_id,
            response,
        }) => {
            assert_eq!(request_id.as_str(), "fp-req-42");
            assert_eq!(response, "YES");
        }
        other => panic!("unexpected post {:?}", other),
    }
}
