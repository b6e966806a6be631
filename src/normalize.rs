//! Mapping raw post-like JSON onto the canonical [`Post`]

use crate::error::{Result, ScrapeError};
use crate::extract::{id_string, is_truthy, truthy_field};
use crate::model::{Author, Media, Post, Stats, permalink};
use indexmap::IndexSet;
use regex::Regex;
use serde_json::{Value, json};
use std::sync::LazyLock;

static LEADING_NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+)").expect("valid reply count regex"));

/// Index of the image candidate to keep; candidates are ordered by descending resolution
const IMAGE_CANDIDATE_INDEX: usize = 1;

/// Transform one raw thread item (bare, or wrapping its payload under `post`) into a [`Post`]
pub fn normalize_post(raw: &Value) -> Result<Post> {
    let post = raw.get("post").filter(|p| p.is_object()).unwrap_or(raw);

    if !post.is_object() {
        return Err(ScrapeError::parse(
            "Failed to transform thread data",
            json!({ "reason": "expected a JSON object", "found": json_type(post) }),
        ));
    }

    let user = post.get("user").unwrap_or(&Value::Null);
    let username = string_field(user, "username");
    let code = string_field(post, "code");

    Ok(Post {
        id: first_id(post, &["id", "pk"]),
        text: post
            .get("caption")
            .and_then(|c| c.get("text"))
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string),
        author: Author {
            user_id: first_id(user, &["pk", "id"]),
            verified: user.get("is_verified").is_some_and(is_truthy),
            profile_picture: string_field(user, "profile_pic_url"),
            username: username.clone(),
        },
        stats: Stats { likes: count_field(post, "like_count"), replies: reply_count(raw, post) },
        media: extract_media(post),
        published_at: published_at(post),
        url: permalink(&username, &code),
        code,
    })
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn string_field(value: &Value, key: &str) -> String {
    truthy_field(value, key).and_then(Value::as_str).unwrap_or_default().to_string()
}

fn first_id(value: &Value, keys: &[&str]) -> String {
    keys.iter().find_map(|key| truthy_field(value, key).and_then(id_string)).unwrap_or_default()
}

fn count_field(value: &Value, key: &str) -> u64 {
    value.get(key).and_then(as_count).unwrap_or(0)
}

fn as_count(value: &Value) -> Option<u64> {
    value.as_u64().or_else(|| value.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
}

/// Explicit direct reply count, else the number inside the "View N replies" call to action
fn reply_count(raw: &Value, post: &Value) -> u64 {
    if let Some(count) =
        post.get("text_post_app_info").and_then(|info| info.get("direct_reply_count")).and_then(as_count)
    {
        return count;
    }

    truthy_field(raw, "view_replies_cta_string")
        .and_then(|cta| match cta {
            Value::String(s) => LEADING_NUMBER.captures(s).and_then(|c| c[1].parse().ok()),
            Value::Number(n) => n.as_u64(),
            _ => None,
        })
        .unwrap_or(0)
}

fn published_at(post: &Value) -> i64 {
    ["taken_at", "timestamp", "created_at"]
        .iter()
        .find_map(|key| {
            let value = post.get(*key)?;
            value.as_i64().or_else(|| value.as_f64().map(|f| f as i64))
        })
        .unwrap_or(0)
}

fn extract_media(post: &Value) -> Option<Media> {
    let images: Vec<String> = post
        .get("carousel_media")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| {
                    item.get("image_versions2")?
                        .get("candidates")?
                        .get(IMAGE_CANDIDATE_INDEX)?
                        .get("url")
                        .filter(|u| is_truthy(u))?
                        .as_str()
                        .map(str::to_string)
                })
                .collect()
        })
        .unwrap_or_default();

    let videos: IndexSet<String> = post
        .get("video_versions")
        .and_then(Value::as_array)
        .map(|versions| {
            versions
                .iter()
                .filter_map(|v| truthy_field(v, "url").and_then(Value::as_str).map(str::to_string))
                .collect()
        })
        .unwrap_or_default();

    let media = Media {
        images: (!images.is_empty()).then_some(images),
        videos: (!videos.is_empty()).then(|| videos.into_iter().collect()),
        has_audio: post.get("has_audio").and_then(Value::as_bool),
    };

    (!media.is_empty()).then_some(media)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn sample_item() -> Value {
        json!({
            "post": {
                "id": "3300000000000000001_63055343223",
                "pk": "3300000000000000001",
                "code": "C5xYz-Ab",
                "caption": {"text": "Shipping today"},
                "taken_at": 1_705_000_000,
                "like_count": 1523,
                "user": {
                    "username": "someone.here",
                    "pk": 63055343223u64,
                    "is_verified": true,
                    "profile_pic_url": "https://cdn.example/p.jpg"
                },
                "text_post_app_info": {"direct_reply_count": 87},
                "carousel_media": [
                    {"image_versions2": {"candidates": [
                        {"url": "https://cdn/1080-a.jpg"}, {"url": "https://cdn/720-a.jpg"}
                    ]}},
                    {"image_versions2": {"candidates": [{"url": "https://cdn/1080-b.jpg"}]}},
                    {"image_versions2": {"candidates": [{"url": "https://cdn/1080-c.jpg"}, {"url": ""}]}},
                    {"image_versions2": {"candidates": [
                        {"url": "https://cdn/1080-d.jpg"}, {"url": "https://cdn/720-d.jpg"}
                    ]}}
                ],
                "video_versions": [
                    {"type": 101, "url": "https://cdn/v.mp4"},
                    {"type": 102, "url": "https://cdn/v.mp4"},
                    {"type": 103, "url": "https://cdn/v-low.mp4"},
                    {"type": 104, "url": null}
                ],
                "has_audio": false
            },
            "view_replies_cta_string": "View 3 replies"
        })
    }

    #[test]
    fn test_full_item() {
        let post = normalize_post(&sample_item()).unwrap();

        assert_eq!(post.id, "3300000000000000001_63055343223");
        assert_eq!(post.code, "C5xYz-Ab");
        assert_eq!(post.text.as_deref(), Some("Shipping today"));
        assert_eq!(post.author.username, "someone.here");
        assert_eq!(post.author.user_id, "63055343223");
        assert!(post.author.verified);
        assert_eq!(post.author.profile_picture, "https://cdn.example/p.jpg");
        assert_eq!(post.stats.likes, 1523);
        assert_eq!(post.stats.replies, 87);
        assert_eq!(post.published_at, 1_705_000_000);
        assert_eq!(post.url, "https://www.threads.net/@someone.here/post/C5xYz-Ab");

        let media = post.media.expect("media should be present");
        assert_eq!(media.images, Some(vec!["https://cdn/720-a.jpg".to_string(), "https://cdn/720-d.jpg".to_string()]));
        assert_eq!(media.videos, Some(vec!["https://cdn/v.mp4".to_string(), "https://cdn/v-low.mp4".to_string()]));
        assert_eq!(media.has_audio, Some(false));
    }

    #[test]
    fn test_bare_object_with_defaults() {
        let post = normalize_post(&json!({"id": "abc"})).unwrap();

        assert_eq!(post.id, "abc");
        assert_eq!(post.code, "");
        assert_eq!(post.text, None);
        assert_eq!(post.author, Author::default());
        assert_eq!(post.stats, Stats::default());
        assert!(post.media.is_none());
        assert_eq!(post.published_at, 0);
        assert_eq!(post.url, "https://www.threads.net/@/post/");
    }

    #[test]
    fn test_reply_count_from_call_to_action() {
        let item = json!({"post": {"id": "1", "code": "x"}, "view_replies_cta_string": "View 12 more replies"});
        assert_eq!(normalize_post(&item).unwrap().stats.replies, 12);

        let item = json!({"post": {"id": "1"}, "view_replies_cta_string": "View replies"});
        assert_eq!(normalize_post(&item).unwrap().stats.replies, 0);
    }

    #[test]
    fn test_explicit_reply_count_wins() {
        let item = json!({
            "post": {"id": "1", "text_post_app_info": {"direct_reply_count": 0}},
            "view_replies_cta_string": "View 5 replies"
        });
        assert_eq!(normalize_post(&item).unwrap().stats.replies, 0);
    }

    #[test]
    fn test_id_falls_back_to_pk() {
        let post = normalize_post(&json!({"pk": 998877, "caption": {"text": "t"}})).unwrap();
        assert_eq!(post.id, "998877");
    }

    #[test]
    fn test_timestamp_fallbacks() {
        assert_eq!(normalize_post(&json!({"id": "a", "created_at": 1234567890})).unwrap().published_at, 1234567890);
        assert_eq!(normalize_post(&json!({"id": "a", "timestamp": 77, "created_at": 1})).unwrap().published_at, 77);
        assert_eq!(normalize_post(&json!({"id": "a", "taken_at": "yesterday"})).unwrap().published_at, 0);
    }

    #[test]
    fn test_empty_carousel_leaves_media_absent() {
        let post = normalize_post(&json!({"id": "a", "carousel_media": [], "video_versions": []})).unwrap();
        assert!(post.media.is_none());
    }

    #[test]
    fn test_non_object_is_parse_error() {
        for raw in [json!(null), json!("post"), json!([1, 2]), json!(7)] {
            let err = normalize_post(&raw).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::ParseError);
            assert_eq!(err.to_string(), "Failed to transform thread data");
            assert!(err.details().is_some());
        }
    }
}
