mod common;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use common::*;
use skynet_core::{PrivateKey, PublicKey, RegistryEntry, Signature, SignedEntry, hash_data_key};
use skynet_db::SkyDb;
use skynet_portal::{PortalClient, PortalRegistry};

fn portal_db(client: &PortalClient) -> SkyDb<PortalRegistry, PortalClient> {
    SkyDb::new(PortalRegistry::new(client.clone()), client.clone())
}

#[tokio::test]
async fn test_get_document_through_portal() {
    let portal = MockPortal::start(|r| match r.path.as_str() {
        "/skynet/registry" => known_entry_reply(),
        path if path == format!("/{KNOWN_SKYLINK}") => Reply::new(200, "{\"message\":\"hi there!\"}"),
        _ => Reply::new(404, ""),
    })
    .await;
    let client = PortalClient::new(&portal.url);
    let db = portal_db(&client);

    let doc = db
        .get_document_bytes(&PublicKey::from_hex(KNOWN_PUBLIC_KEY).unwrap(), KNOWN_DATA_KEY)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(&doc[..], b"{\"message\":\"hi there!\"}");

    let requests = portal.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].path, "/skynet/registry");
    assert_eq!(requests[1].path, format!("/{KNOWN_SKYLINK}"));
}

#[tokio::test]
async fn test_get_missing_document_through_portal() {
    let portal = MockPortal::start(|_| Reply::new(404, "")).await;
    let client = PortalClient::new(&portal.url);
    let db = portal_db(&client);

    let doc = db
        .get_document(&PublicKey::from_hex(KNOWN_PUBLIC_KEY).unwrap(), "nothing here")
        .await
        .unwrap();
    assert!(doc.is_none());
    assert_eq!(portal.requests().len(), 1);
}

#[tokio::test]
async fn test_set_document_through_portal() {
    let key = PrivateKey::from_seed(&[3; 32]);
    let current = RegistryEntry::new("app.json", KNOWN_SKYLINK, 2).sign(&key);
    let current_reply = Reply::json(
        200,
        serde_json::json!({
            "data": hex::encode(&current.entry.data),
            "revision": 2,
            "signature": current.signature.to_hex(),
        }),
    );
    let portal = MockPortal::start(move |r| match (r.method.as_str(), r.path.as_str()) {
        ("GET", "/skynet/registry") => current_reply.clone(),
        ("POST", "/skynet/skyfile") => {
            Reply::json(200, serde_json::json!({ "skylink": KNOWN_SKYLINK }))
        }
        ("POST", "/skynet/registry") => Reply::new(204, ""),
        _ => Reply::new(404, ""),
    })
    .await;
    let client = PortalClient::new(&portal.url);
    let db = portal_db(&client);

    let entry = db
        .set_document(&key, "app.json", b"{\"version\":3}", None)
        .await
        .unwrap();
    assert_eq!(entry.revision, 3);

    let upload = &portal.requests_to("/skynet/skyfile")[0];
    let body = upload.body_text().to_lowercase();
    assert!(body.contains(r#"name="file"; filename="temp-app_json"#));
    assert!(body.contains("{\"version\":3}"));

    let posts: Vec<_> = portal
        .requests_to("/skynet/registry")
        .into_iter()
        .filter(|r| r.method == "POST")
        .collect();
    assert_eq!(posts.len(), 1);
    let json = posts[0].json();
    assert_eq!(json["revision"], 3);
    assert_eq!(json["datakey"], hash_data_key("app.json").to_hex());
    assert_eq!(
        json["publickey"]["key"],
        STANDARD.encode(key.public_key().as_bytes())
    );
    assert_eq!(
        STANDARD.decode(json["data"].as_str().unwrap()).unwrap(),
        KNOWN_SKYLINK.as_bytes()
    );

    let signature: Vec<u8> = json["signature"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b.as_u64().unwrap() as u8)
        .collect();
    let published = SignedEntry {
        entry,
        signature: Signature::from_bytes(&signature).unwrap(),
    };
    assert!(published.verify(&key.public_key()).unwrap());
}
