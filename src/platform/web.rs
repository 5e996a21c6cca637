//! Browser motion sensors via `devicemotion`
//!
//! Accelerometer samples come from `accelerationIncludingGravity` (m/s²);
//! gyroscope samples from `rotationRate`, converted from deg/s to rad/s with
//! axes (beta, gamma, alpha) → (x, y, z).

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::DeviceMotionEvent;

use super::MotionPermission;
use crate::error::{Result, SandboxError};
use crate::sim::{GravitySource, SensorBackend, SensorFeed, SensorSample};

const EVENT: &str = "devicemotion";

/// Extract a sample for `source` from a motion event
fn sample_from_event(source: GravitySource, event: &DeviceMotionEvent) -> Option<SensorSample> {
    match source {
        GravitySource::Fixed => None,
        GravitySource::Accelerometer => {
            let a = event.acceleration_including_gravity()?;
            Some(SensorSample::new(
                a.x()? as f32,
                a.y()? as f32,
                a.z().unwrap_or(0.0) as f32,
            ))
        }
        GravitySource::Gyroscope => {
            let r = event.rotation_rate()?;
            Some(SensorSample::new(
                r.beta()?.to_radians() as f32,
                r.gamma()?.to_radians() as f32,
                r.alpha().unwrap_or(0.0).to_radians() as f32,
            ))
        }
    }
}

/// Ask for motion access where the browser gates it behind
/// `DeviceMotionEvent.requestPermission` (iOS 13+). Must run inside a user
/// gesture; the answer is only logged since samples simply never arrive
/// when access is denied.
fn request_motion_permission(window: &web_sys::Window) {
    let Ok(ctor) = js_sys::Reflect::get(window, &JsValue::from_str("DeviceMotionEvent")) else {
        return;
    };
    let Ok(request) = js_sys::Reflect::get(&ctor, &JsValue::from_str("requestPermission")) else {
        return;
    };
    let Some(request) = request.dyn_ref::<js_sys::Function>() else {
        return;
    };

    log::warn!("Motion sensors require permission on this browser; requesting it");
    let promise = match request.call0(&ctor).map(|p| p.dyn_into::<js_sys::Promise>()) {
        Ok(Ok(promise)) => promise,
        Ok(Err(value)) | Err(value) => {
            log::warn!("Motion permission request failed: {:?}", value);
            return;
        }
    };
    wasm_bindgen_futures::spawn_local(async move {
        match wasm_bindgen_futures::JsFuture::from(promise).await {
            Ok(state) => {
                let permission = MotionPermission::from_state(state.as_string().as_deref());
                if permission.is_granted() {
                    log::info!("Motion permission granted");
                } else {
                    log::warn!("Motion permission {:?}; no sensor samples will arrive", permission);
                }
            }
            Err(e) => log::warn!("Motion permission request rejected: {:?}", e),
        }
    });
}

/// `devicemotion` listener bound to a sensor feed
#[derive(Default)]
pub struct WebSensors {
    listener: Option<Closure<dyn FnMut(DeviceMotionEvent)>>,
}

impl SensorBackend for WebSensors {
    fn attach(&mut self, source: GravitySource, feed: SensorFeed) -> Result<()> {
        let window = web_sys::window()
            .ok_or_else(|| SandboxError::SensorListener("no window".to_string()))?;
        if !js_sys::Reflect::has(&window, &JsValue::from_str("DeviceMotionEvent")).unwrap_or(false) {
            return Err(SandboxError::SensorUnavailable { kind: source });
        }

        request_motion_permission(&window);

        self.detach();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: DeviceMotionEvent| {
            if let Some(sample) = sample_from_event(source, &event) {
                feed.push(sample);
            }
        });
        window
            .add_event_listener_with_callback(EVENT, closure.as_ref().unchecked_ref())
            .map_err(|e| SandboxError::SensorListener(format!("{:?}", e)))?;
        self.listener = Some(closure);
        log::info!("Listening for {} ({})", EVENT, source.as_str());
        Ok(())
    }

    fn detach(&mut self) {
        let Some(closure) = self.listener.take() else {
            return;
        };
        if let Some(window) = web_sys::window() {
            if let Err(e) = window
                .remove_event_listener_with_callback(EVENT, closure.as_ref().unchecked_ref())
            {
                log::warn!("Failed to remove {} listener: {:?}", EVENT, e);
            }
        }
    }
}
