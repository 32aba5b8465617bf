//! Unit tests for preseed upload

#[cfg(test)]
mod tests {
    use crate::mock::*;
    use crate::{MrpError, PreseedType};
    use std::io::Write;

    const KICKSTART: &str = "install\nurl --url http://mirror/\n%packages\n@core\n%end\n";

    fn preseed_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(content.as_bytes()).expect("write temp file");
        file
    }

    #[tokio::test]
    async fn test_ensure_preseed_nothing_to_upload_nothing_to_reuse() {
        let server = MockMrpServer::new("http://test-mrp");

        let result = server
            .client()
            .preseeds()
            .ensure_preseed("base", None, PreseedType::Preseed, None, false, false)
            .await;

        assert!(matches!(result, Err(MrpError::InvalidArgument(_))));
        assert_eq!(server.write_count(), 0);
    }

    #[tokio::test]
    async fn test_ensure_preseed_reads_through_without_file() {
        let server = MockMrpServer::new("http://test-mrp");
        server.add_preseed(test_preseed(4, "base", PreseedType::Preseed, "d-i foo\n"));

        let preseed = server
            .client()
            .preseeds()
            .ensure_preseed("base", None, PreseedType::Preseed, None, false, false)
            .await
            .expect("existing preseed");

        assert_eq!(preseed.id, 4);
        assert_eq!(preseed.content, None);
        assert_eq!(server.write_count(), 0);
    }

    #[tokio::test]
    async fn test_ensure_preseed_creates_when_absent() {
        let server = MockMrpServer::new("http://test-mrp");
        let file = preseed_file(KICKSTART);

        let preseed = server
            .client()
            .preseeds()
            .ensure_preseed("centos", Some(file.path()), PreseedType::Kickstart, Some(""), true, false)
            .await
            .expect("create");

        let posts = server.requests_with_method("POST");
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].path, "/api/v1/preseed");
        assert_eq!(
            posts[0].body,
            Some(serde_json::json!({
                "name": "centos",
                "type": "kickstart",
                "public": true,
                "known_good": false,
                "content": KICKSTART,
            }))
        );
        assert_eq!(preseed.content.as_deref(), Some(KICKSTART));
    }

    #[tokio::test]
    async fn test_ensure_preseed_updates_existing_by_id() {
        let server = MockMrpServer::new("http://test-mrp");
        server.add_preseed(test_preseed(4, "base", PreseedType::Preseed, "old\n"));
        let file = preseed_file("d-i new\n");

        let preseed = server
            .client()
            .preseeds()
            .ensure_preseed("base", Some(file.path()), PreseedType::Preseed, Some("lab"), false, true)
            .await
            .expect("update");

        let puts = server.requests_with_method("PUT");
        assert_eq!(puts.len(), 1);
        assert_eq!(puts[0].path, "/api/v1/preseed/4");
        let body = puts[0].body.as_ref().expect("json body");
        assert_eq!(body["description"], "lab");
        assert!(server.requests_with_method("POST").is_empty());
        assert_eq!(preseed.id, 4);
        assert_eq!(preseed.content.as_deref(), Some("d-i new\n"));
    }

    #[tokio::test]
    async fn test_preseed_content_only_from_direct_fetch() {
        let server = MockMrpServer::new("http://test-mrp");
        let file = preseed_file(KICKSTART);
        let preseeds = server.client().preseeds();

        let created = preseeds
            .ensure_preseed("centos", Some(file.path()), PreseedType::Kickstart, None, false, false)
            .await
            .expect("create");

        let listed = preseeds
            .find_preseed("centos", None)
            .await
            .expect("lookup")
            .expect("listed");
        let fetched = preseeds.get_preseed(created.id).await.expect("fetch");

        assert_eq!(listed.content, None);
        assert_eq!(fetched.content.as_deref(), Some(KICKSTART));
        assert_eq!(
            server.requests().last().map(|r| r.path.clone()),
            Some(format!("/api/v1/preseed/{}", created.id))
        );
    }

    #[tokio::test]
    async fn test_ensure_preseed_missing_file_is_io_error() {
        let server = MockMrpServer::new("http://test-mrp");
        let dir = tempfile::tempdir().expect("temp dir");
        let missing = dir.path().join("missing.cfg");

        let result = server
            .client()
            .preseeds()
            .ensure_preseed("base", Some(missing.as_path()), PreseedType::Preseed, None, false, false)
            .await;

        assert!(matches!(result, Err(MrpError::Io { .. })));
        assert_eq!(server.write_count(), 0);
    }

    #[tokio::test]
    async fn test_ensure_preseed_rejects_empty_file() {
        let server = MockMrpServer::new("http://test-mrp");
        let file = preseed_file("");

        let result = server
            .client()
            .preseeds()
            .ensure_preseed("base", Some(file.path()), PreseedType::Preseed, None, false, false)
            .await;

        assert!(matches!(result, Err(MrpError::InvalidArgument(_))));
        assert_eq!(server.write_count(), 0);
    }

    #[tokio::test]
    async fn test_get_preseed_id_unknown() {
        let server = MockMrpServer::new("http://test-mrp");

        let result = server.client().preseeds().get_preseed_id("ghost").await;

        assert!(matches!(result, Err(MrpError::UnknownPreseed(name)) if name == "ghost"));
    }
}
