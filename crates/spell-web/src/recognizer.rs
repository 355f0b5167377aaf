use std::cell::RefCell;
use std::rc::Rc;

use js_sys::{Array, Function, Reflect};
use spell_core::{RecognitionEvent, RecognitionId, RecognizerConfig, SpeechError, SpeechRecognizer};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    DomException, Event, MediaStream, MediaStreamConstraints, MediaStreamTrack, SpeechGrammarList,
    SpeechRecognition,
};

/// Receives completions; the crate root routes them into the runner.
pub type RecognitionSink = Rc<dyn Fn(RecognitionEvent)>;

/// Live browser recognition plus the closures bound to it.
struct ActiveRecognition {
    id: RecognitionId,
    recognition: SpeechRecognition,
    _on_result: Closure<dyn FnMut(Event)>,
    _on_error: Closure<dyn FnMut(Event)>,
    _on_end: Closure<dyn FnMut(Event)>,
}

impl Drop for ActiveRecognition {
    fn drop(&mut self) {
        // Detach before the closures are freed so a late browser event
        // cannot call into dropped Rust code.
        self.recognition.set_onresult(None);
        self.recognition.set_onerror(None);
        self.recognition.set_onend(None);
        self.recognition.abort();
    }
}

#[derive(Default)]
struct Shared {
    /// Operation requested by the gate and not yet cancelled.
    current: Option<RecognitionId>,
    active: Option<ActiveRecognition>,
}

/// [`SpeechRecognizer`] backed by `SpeechRecognition` / `webkitSpeechRecognition`.
///
/// `start` probes the microphone first (permission prompt), then opens a
/// single-utterance recognition. Completions are delivered to the sink tagged
/// with the operation id; the gate drops any that are stale.
pub struct WebSpeechRecognizer {
    sink: RecognitionSink,
    shared: Rc<RefCell<Shared>>,
}

impl WebSpeechRecognizer {
    pub fn new(sink: RecognitionSink) -> Self {
        Self { sink, shared: Rc::default() }
    }
}

impl SpeechRecognizer for WebSpeechRecognizer {
    fn is_supported(&self) -> bool {
        recognition_constructor().is_some()
    }

    fn start(&mut self, id: RecognitionId, config: &RecognizerConfig) -> Result<(), SpeechError> {
        let ctor = recognition_constructor().ok_or(SpeechError::Unsupported)?;

        let previous = {
            let mut shared = self.shared.borrow_mut();
            shared.current = Some(id);
            shared.active.take()
        };
        drop(previous);

        let shared = self.shared.clone();
        let sink = self.sink.clone();
        let config = config.clone();
        wasm_bindgen_futures::spawn_local(async move {
            let probe = request_microphone().await;
            let still_current = shared.borrow().current == Some(id);
            if !still_current {
                return;
            }
            if let Err(err) = probe {
                log::warn!("speech: microphone unavailable: {}", err);
                sink(RecognitionEvent::failed(id, err));
                return;
            }
            match begin(id, &ctor, &config, &sink) {
                Ok(active) => {
                    let replaced = shared.borrow_mut().active.replace(active);
                    drop(replaced);
                }
                Err(err) => sink(RecognitionEvent::failed(id, err)),
            }
        });
        Ok(())
    }

    fn stop(&mut self, id: RecognitionId) {
        let finished = {
            let mut shared = self.shared.borrow_mut();
            if shared.current == Some(id) {
                shared.current = None;
            }
            if shared.active.as_ref().map(|a| a.id) == Some(id) {
                shared.active.take()
            } else {
                None
            }
        };
        drop(finished);
    }
}

fn recognition_constructor() -> Option<Function> {
    let window = web_sys::window()?;
    ["SpeechRecognition", "webkitSpeechRecognition"]
        .iter()
        .filter_map(|name| Reflect::get(&window, &JsValue::from_str(name)).ok())
        .find_map(|value| value.dyn_into::<Function>().ok())
}

/// Ask for the microphone once so permission problems surface with a clear
/// error, then release the stream immediately.
async fn request_microphone() -> Result<(), SpeechError> {
    let window = web_sys::window().ok_or(SpeechError::CaptureUnavailable)?;
    let devices = window
        .navigator()
        .media_devices()
        .map_err(|_| SpeechError::CaptureUnavailable)?;

    let constraints = MediaStreamConstraints::new();
    constraints.set_audio(&JsValue::TRUE);
    let promise = devices
        .get_user_media_with_constraints(&constraints)
        .map_err(|e| classify_media_error(&e))?;
    let stream: MediaStream = JsFuture::from(promise)
        .await
        .map_err(|e| classify_media_error(&e))?
        .unchecked_into();

    for track in stream.get_tracks().iter() {
        track.unchecked_into::<MediaStreamTrack>().stop();
    }
    Ok(())
}

fn classify_media_error(err: &JsValue) -> SpeechError {
    match err.dyn_ref::<DomException>().map(|e| e.name()) {
        Some(name) if name == "NotAllowedError" || name == "SecurityError" => {
            SpeechError::PermissionDenied
        }
        _ => SpeechError::CaptureUnavailable,
    }
}

fn begin(
    id: RecognitionId,
    ctor: &Function,
    config: &RecognizerConfig,
    sink: &RecognitionSink,
) -> Result<ActiveRecognition, SpeechError> {
    let recognition: SpeechRecognition = Reflect::construct(ctor, &Array::new())
        .map_err(|_| SpeechError::Unsupported)?
        .unchecked_into();

    recognition.set_lang(&config.language);
    recognition.set_continuous(false);
    recognition.set_interim_results(false);
    recognition.set_max_alternatives(config.max_alternatives);
    if let Some(grammar) = config.jsgf_grammar() {
        match grammar_list(&grammar) {
            Some(list) => recognition.set_grammars(&list),
            None => log::debug!("speech: grammar hints not supported here"),
        }
    }

    let on_result = {
        let sink = sink.clone();
        Closure::wrap(Box::new(move |event: Event| {
            match best_transcript(&event) {
                Some(text) => sink(RecognitionEvent::transcript(id, text)),
                None => sink(RecognitionEvent::ended(id)),
            }
        }) as Box<dyn FnMut(Event)>)
    };
    let on_error = {
        let sink = sink.clone();
        Closure::wrap(Box::new(move |event: Event| {
            let code = Reflect::get(&event, &JsValue::from_str("error"))
                .ok()
                .and_then(|v| v.as_string())
                .unwrap_or_default();
            log::info!("speech: recognition error {:?}", code);
            match SpeechError::from_code(&code) {
                Some(err) => sink(RecognitionEvent::failed(id, err)),
                None => sink(RecognitionEvent::ended(id)),
            }
        }) as Box<dyn FnMut(Event)>)
    };
    let on_end = {
        let sink = sink.clone();
        Closure::wrap(Box::new(move |_event: Event| {
            sink(RecognitionEvent::ended(id));
        }) as Box<dyn FnMut(Event)>)
    };

    recognition.set_onresult(Some(on_result.as_ref().unchecked_ref()));
    recognition.set_onerror(Some(on_error.as_ref().unchecked_ref()));
    recognition.set_onend(Some(on_end.as_ref().unchecked_ref()));

    let active = ActiveRecognition {
        id,
        recognition,
        _on_result: on_result,
        _on_error: on_error,
        _on_end: on_end,
    };
    active.recognition.start().map_err(|e| {
        log::warn!("speech: start rejected: {:?}", e);
        SpeechError::Unknown("start-failed".to_string())
    })?;
    log::debug!("speech: listening ({:?}, {})", id, config.language);
    Ok(active)
}

fn grammar_list(grammar: &str) -> Option<SpeechGrammarList> {
    let window = web_sys::window()?;
    let ctor = ["SpeechGrammarList", "webkitSpeechGrammarList"]
        .iter()
        .filter_map(|name| Reflect::get(&window, &JsValue::from_str(name)).ok())
        .find_map(|value| value.dyn_into::<Function>().ok())?;
    let list = Reflect::construct(&ctor, &Array::new()).ok()?;
    let add: Function = Reflect::get(&list, &JsValue::from_str("addFromString"))
        .ok()?
        .dyn_into()
        .ok()?;
    add.call2(&list, &JsValue::from_str(grammar), &JsValue::from_f64(1.0)).ok()?;
    Some(list.unchecked_into())
}

/// First alternative of the first result, if the event carries one.
fn best_transcript(event: &Event) -> Option<String> {
    let results = Reflect::get(event, &JsValue::from_str("results")).ok()?;
    let first = Reflect::get_u32(&results, 0).ok()?;
    let best = Reflect::get_u32(&first, 0).ok()?;
    Reflect::get(&best, &JsValue::from_str("transcript")).ok()?.as_string()
}
