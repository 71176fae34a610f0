// SPDX-License-Identifier: PMPL-1.0-or-later
//! Media checker - WCAG 1.2.x Time-based Media and 1.4.2 Audio Control
//!
//! Checks that time-based media has accessible alternatives:
//! - `<video>` elements have caption tracks in a supported format
//! - `<audio>` elements have a transcript nearby
//! - Autoplaying media is muted and controllable
//! - Embedded players are titled and have fallback content

use super::{contains_any, Rule, SeverityWeights};
use crate::document::{Document, Element};
use crate::model::{Category, Finding, Severity};
use regex::Regex;
use std::sync::LazyLock;

pub const WEIGHTS: SeverityWeights = SeverityWeights::new(15.0, 10.0, 5.0, 2.0);

pub const RULES: &[Rule] = &[
    Rule { id: "video-captions", check: check_video_captions },
    Rule { id: "audio-transcripts", check: check_audio_transcripts },
    Rule { id: "autoplay", check: check_autoplay },
    Rule { id: "media-controls", check: check_controls },
    Rule { id: "audio-description", check: check_audio_description },
    Rule { id: "embedded-media", check: check_embedded },
    Rule { id: "media-alternatives", check: check_alternatives },
    Rule { id: "live-captions", check: check_live_captions },
];

const CAPTION_FORMATS: &[&str] = &[".vtt", ".srt", ".webvtt"];

const TRANSCRIPT_KEYWORDS: &[&str] = &["transcript", "script", "대본", "스크립트"];

const CONTROL_KEYWORDS: &[&str] = &["play", "pause", "stop", "volume", "재생", "정지", "볼륨"];

const MEDIA_DOMAINS: &[&str] = &[
    "youtube.com", "youtu.be", "vimeo.com", "dailymotion.com", "twitch.tv", "soundcloud.com",
    "spotify.com",
];

const MEDIA_EXTENSIONS: &[&str] = &[".mp4", ".avi", ".mov", ".wmv", ".mp3", ".wav", ".ogg"];

const LIVE_CAPTION_KEYWORDS: &[&str] = &[
    "live caption", "real-time caption", "closed caption", "실시간 자막", "라이브 자막",
    "동시 자막",
];

/// Autoplay longer than this needs a way to stop it
const AUTOPLAY_LIMIT_SECS: f64 = 3.0;

const TEXT_ALTERNATIVE_CHARS: usize = 50;

fn issue(rule_id: &str, severity: Severity, message: &str) -> Finding {
    Finding::new(rule_id, Category::Media, severity, message)
}

fn is_caption_track(track: &Element<'_>) -> bool {
    matches!(track.attr("kind"), Some("captions") | Some("subtitles"))
}

/// Extension of a caption source including the dot, or empty
pub fn caption_extension(src: &str) -> String {
    let path = src.split(['?', '#']).next().unwrap_or("");
    let name = path.rsplit('/').next().unwrap_or("");
    match name.rsplit_once('.') {
        Some((_, ext)) => format!(".{}", ext.to_lowercase()),
        None => String::new(),
    }
}

fn has_transcript_nearby(audio: Element<'_>) -> bool {
    let Some(parent) = audio.parent() else {
        return false;
    };
    if contains_any(&parent.text().to_lowercase(), TRANSCRIPT_KEYWORDS) {
        return true;
    }
    parent.find_all("a").iter().any(|link| {
        link.attr("href").map_or(false, |href| {
            contains_any(&link.text().to_lowercase(), TRANSCRIPT_KEYWORDS)
                || contains_any(&href.to_lowercase(), TRANSCRIPT_KEYWORDS)
        })
    })
}

fn has_custom_controls(media: Element<'_>) -> bool {
    let Some(parent) = media.parent() else {
        return false;
    };
    parent.find_all("button").iter().any(|button| {
        let label = format!(
            "{} {} {}",
            button.text(),
            button.attr("aria-label").unwrap_or(""),
            button.attr("title").unwrap_or("")
        )
        .to_lowercase();
        contains_any(&label, CONTROL_KEYWORDS)
    })
}

/// Declared duration in seconds, if parseable
fn declared_duration(media: Element<'_>) -> Option<f64> {
    media.attr("duration")?.trim().parse().ok()
}

fn has_text_alternative_nearby(media: Element<'_>) -> bool {
    media.parent().map_or(false, |parent| {
        parent
            .children()
            .filter(|c| *c != media)
            .any(|c| c.stripped_text().chars().count() > TEXT_ALTERNATIVE_CHARS)
    })
}

fn is_media_iframe(src: &str) -> bool {
    contains_any(&src.to_lowercase(), MEDIA_DOMAINS)
}

fn is_media_embed(embed: Element<'_>) -> bool {
    let kind = embed.attr("type").unwrap_or("");
    if kind.contains("video") || kind.contains("audio") {
        return true;
    }
    let source = format!("{}{}", embed.attr("src").unwrap_or(""), embed.attr("data").unwrap_or(""));
    contains_any(&source.to_lowercase(), MEDIA_EXTENSIONS)
}

fn check_video_captions(doc: &Document) -> Vec<Finding> {
    let mut findings = Vec::new();

    for video in doc.by_tag("video") {
        let tracks: Vec<_> = video
            .find_all("track")
            .into_iter()
            .filter(is_caption_track)
            .collect();

        if tracks.is_empty() {
            findings.push(
                issue("video-captions", Severity::High, "Video has no captions")
                    .with_description("The video has no <track kind=\"captions\"> or subtitles track")
                    .with_element(video.snippet())
                    .with_recommendation("Add a WebVTT caption track with <track kind=\"captions\">")
                    .with_wcag("1.2.2 Captions (Prerecorded)"),
            );
            continue;
        }

        for track in tracks {
            if let Some(src) = track.non_empty_attr("src") {
                let ext = caption_extension(src);
                if !CAPTION_FORMATS.contains(&ext.as_str()) {
                    findings.push(
                        issue("video-captions", Severity::Medium, &format!("Unsupported caption format: '{}'", ext))
                            .with_description("Caption files should be WebVTT (.vtt) or SRT")
                            .with_element(track.snippet())
                            .with_recommendation("Convert the captions to WebVTT")
                            .with_wcag("1.2.2 Captions (Prerecorded)"),
                    );
                }
            }

            if track.non_empty_attr("srclang").is_none() {
                findings.push(
                    issue("video-captions", Severity::Medium, "Caption track has no srclang")
                        .with_description("The language of the captions is not declared")
                        .with_element(track.snippet())
                        .with_recommendation("Add srclang, e.g. srclang=\"en\"")
                        .with_wcag("3.1.2 Language of Parts")
                        .as_fixable(),
                );
            }

            if track.non_empty_attr("label").is_none() {
                findings.push(
                    issue("video-captions", Severity::Low, "Caption track has no label")
                        .with_description("The track has no user-visible label")
                        .with_element(track.snippet())
                        .with_recommendation("Add label, e.g. label=\"English\"")
                        .with_wcag("1.2.2 Captions (Prerecorded)")
                        .as_fixable(),
                );
            }
        }
    }

    findings
}

fn check_audio_transcripts(doc: &Document) -> Vec<Finding> {
    doc.by_tag("audio")
        .into_iter()
        .filter(|audio| !has_transcript_nearby(*audio))
        .map(|audio| {
            issue("audio-transcripts", Severity::High, "Audio has no transcript")
                .with_description("No transcript or text alternative was found near the audio")
                .with_element(audio.snippet())
                .with_recommendation("Provide a transcript next to the audio or link to one")
                .with_wcag("1.2.1 Audio-only and Video-only (Prerecorded)")
        })
        .collect()
}

fn check_autoplay(doc: &Document) -> Vec<Finding> {
    let mut findings = Vec::new();

    for media in doc.by_tags(&["video", "audio"]) {
        if !media.has_attr("autoplay") {
            continue;
        }

        if !media.has_attr("muted") {
            findings.push(
                issue("autoplay", Severity::High, "Media with sound plays automatically")
                    .with_description("Autoplaying audio interferes with screen readers")
                    .with_element(media.snippet())
                    .with_recommendation("Remove autoplay or add muted")
                    .with_wcag("1.4.2 Audio Control")
                    .as_fixable(),
            );
        }

        let exceeds = declared_duration(media).map_or(true, |secs| secs > AUTOPLAY_LIMIT_SECS);
        if exceeds {
            findings.push(
                issue("autoplay", Severity::Medium, "Media autoplays for more than 3 seconds")
                    .with_description("Autoplaying media longer than 3 seconds needs a pause or stop control")
                    .with_element(media.snippet())
                    .with_recommendation("Provide a pause control or avoid autoplay")
                    .with_wcag("2.2.2 Pause, Stop, Hide"),
            );
        }
    }

    findings
}

fn check_controls(doc: &Document) -> Vec<Finding> {
    doc.by_tags(&["video", "audio"])
        .into_iter()
        .filter(|media| !media.has_attr("controls") && !has_custom_controls(*media))
        .map(|media| {
            issue("media-controls", Severity::High, "Media has no controls")
                .with_description("The media element has neither native controls nor custom playback buttons")
                .with_element(media.snippet())
                .with_recommendation("Add the controls attribute or accessible play/pause buttons")
                .with_wcag("2.1.1 Keyboard")
                .as_fixable()
        })
        .collect()
}

fn check_audio_description(doc: &Document) -> Vec<Finding> {
    // Every video is presumed to carry visual information
    doc.by_tag("video")
        .into_iter()
        .filter(|video| {
            !video
                .find_all("track")
                .iter()
                .any(|t| t.attr("kind") == Some("descriptions"))
        })
        .map(|video| {
            issue("audio-description", Severity::Medium, "Video has no audio description")
                .with_description("No <track kind=\"descriptions\"> describes the visual content")
                .with_element(video.snippet())
                .with_recommendation("Add an audio description track or a described version of the video")
                .with_wcag("1.2.5 Audio Description (Prerecorded)")
        })
        .collect()
}

fn check_embedded(doc: &Document) -> Vec<Finding> {
    let mut findings = Vec::new();

    for iframe in doc.by_tag("iframe") {
        if !is_media_iframe(iframe.attr("src").unwrap_or("")) {
            continue;
        }

        if iframe.non_empty_attr("title").is_none() {
            findings.push(
                issue("embedded-media", Severity::Medium, "Embedded media has no title")
                    .with_description("The media iframe has no descriptive title")
                    .with_element(iframe.snippet())
                    .with_recommendation("Add a title describing the embedded media")
                    .with_wcag("4.1.2 Name, Role, Value")
                    .as_fixable(),
            );
        }

        if iframe.stripped_text().is_empty() {
            findings.push(
                issue("embedded-media", Severity::Low, "Embedded media has no fallback content")
                    .with_description("Nothing is shown when the iframe cannot be displayed")
                    .with_element(iframe.snippet())
                    .with_recommendation("Add fallback content such as a link to the media")
                    .with_wcag("1.1.1 Non-text Content"),
            );
        }
    }

    for embed in doc.by_tags(&["embed", "object"]) {
        if !is_media_embed(embed) {
            continue;
        }
        let has_alternative = embed.non_empty_attr("alt").is_some()
            || embed.non_empty_attr("title").is_some()
            || !embed.stripped_text().is_empty();
        if !has_alternative {
            findings.push(
                issue("embedded-media", Severity::Medium, "Embedded media has no text alternative")
                    .with_description("The embed/object element has no alternative text")
                    .with_element(embed.snippet())
                    .with_recommendation("Add a title or fallback text to the element")
                    .with_wcag("1.1.1 Non-text Content"),
            );
        }
    }

    findings
}

fn check_alternatives(doc: &Document) -> Vec<Finding> {
    doc.by_tag("video")
        .into_iter()
        .filter(|video| video.non_empty_attr("poster").is_none() && !has_text_alternative_nearby(*video))
        .map(|video| {
            issue("media-alternatives", Severity::Low, "Video has no poster image")
                .with_description("The video has no poster and no nearby text alternative")
                .with_element(video.snippet())
                .with_recommendation("Add a poster image or a text summary of the video")
                .with_wcag("1.2.3 Audio Description or Media Alternative")
        })
        .collect()
}

static LIVE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)live|stream").expect("valid regex"));

fn check_live_captions(doc: &Document) -> Vec<Finding> {
    doc.with_attr("class")
        .into_iter()
        .filter(|e| LIVE_RE.is_match(e.attr("class").unwrap_or("")))
        .filter(|e| e.descendants().any(|d| matches!(d.name(), "video" | "audio" | "iframe")))
        .filter(|e| {
            let content = format!("{} {}", e.text(), e.class_string()).to_lowercase();
            !contains_any(&content, LIVE_CAPTION_KEYWORDS)
        })
        .map(|e| {
            issue("live-captions", Severity::Medium, "Live media may lack real-time captions")
                .with_description("No real-time captioning was found for live streamed content")
                .with_element(e.snippet())
                .with_recommendation("Provide live captions for streamed audio and video")
                .with_wcag("1.2.4 Captions (Live)")
        })
        .collect()
}
