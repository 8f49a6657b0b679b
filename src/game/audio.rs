//! Looping sea ambience while the game screen is up, with a mute toggle.

use std::cell::RefCell;

use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::HtmlAudioElement;

use crate::constants::BACKGROUND_MUSIC_SRC;

/// Joined / muted flags. Muting keeps the track running silently; leaving the
/// game screen pauses it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MusicState {
    joined: bool,
    muted: bool,
}

impl MusicState {
    pub fn join(&mut self) {
        self.joined = true;
    }

    pub fn leave(&mut self) {
        self.joined = false;
    }

    /// Returns the new muted flag.
    pub fn toggle_mute(&mut self) -> bool {
        self.muted = !self.muted;
        self.muted
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn is_joined(&self) -> bool {
        self.joined
    }

    pub fn should_play(&self) -> bool {
        self.joined && !self.muted
    }
}

struct Music {
    state: MusicState,
    track: Option<HtmlAudioElement>,
}

thread_local! {
    static MUSIC: RefCell<Music> = const {
        RefCell::new(Music {
            state: MusicState { joined: false, muted: false },
            track: None,
        })
    };
}

/// Bring the `<audio>` element in line with `state`. The element is only
/// created once the player first joins.
fn sync(music: &mut Music) {
    if music.track.is_none() {
        if !music.state.is_joined() {
            return;
        }
        match HtmlAudioElement::new_with_src(BACKGROUND_MUSIC_SRC) {
            Ok(track) => {
                track.set_loop(true);
                music.track = Some(track);
            }
            Err(e) => {
                web_sys::console::warn_1(&e);
                return;
            }
        }
    }
    let Some(track) = music.track.as_ref() else {
        return;
    };
    track.set_muted(music.state.is_muted());
    if music.state.should_play() {
        match track.play() {
            // Autoplay policies may refuse; the game runs fine without sound.
            Ok(promise) => wasm_bindgen_futures::spawn_local(async move {
                if let Err(e) = JsFuture::from(promise).await {
                    log::warn!("background music refused to play");
                    web_sys::console::warn_1(&e);
                }
            }),
            Err(e) => web_sys::console::warn_1(&e),
        }
    } else if !music.state.is_joined() {
        if let Err(e) = track.pause() {
            web_sys::console::warn_1(&e);
        }
    }
}

fn update(change: impl FnOnce(&mut MusicState)) -> MusicState {
    MUSIC.with(|m| {
        let mut music = m.borrow_mut();
        change(&mut music.state);
        sync(&mut music);
        music.state
    })
}

pub(super) fn join() {
    update(MusicState::join);
}

pub(super) fn leave() {
    update(MusicState::leave);
}

/// Flip the muted flag; returns whether sound is now muted.
pub fn toggle_mute() -> bool {
    update(|s| {
        s.toggle_mute();
    })
    .is_muted()
}

pub fn is_muted() -> bool {
    MUSIC.with(|m| m.borrow().state.is_muted())
}
