// tests/usage_scan.rs
use bynder_usage_sync::blocks::{
    block_for_asset, gallery_for_assets, AssetFile, AssetType, SelectedAsset,
};
use bynder_usage_sync::content::ContentItem;
use bynder_usage_sync::usage::payload::{AssetReference, UsageSyncPayload, INTEGRATION_ID};
use bynder_usage_sync::usage::scanner::scan_items;
use bynder_usage_sync::PortalSettings;

fn fig(id: &str) -> String {
    format!(r#"<!-- wp:image --><figure class="wp-block-image" data-bynder-id="{id}"><img src="x.jpg"/></figure><!-- /wp:image -->"#)
}

#[test]
fn item_without_markers_contributes_only_its_uri() {
    let item = ContentItem::new("https://site.test/?p=1", "Plain", "<p>No assets here.</p>");
    let out = scan_items([&item]);
    assert_eq!(out.uris, vec!["https://site.test/?p=1".to_string()]);
    assert!(out.usages.is_empty());
}

#[test]
fn n_markers_yield_n_usages_and_one_uri() {
    for n in 0..5 {
        let body: String = (0..n).map(|i| fig(&format!("ID{i}"))).collect();
        let item = ContentItem::new("https://site.test/?p=7", "Gallery", body);
        let out = scan_items([&item]);
        assert_eq!(out.uris.len(), 1, "n={n}");
        assert_eq!(out.usages.len(), n, "n={n}");
        assert!(out
            .usages
            .iter()
            .all(|u| u.uri == "https://site.test/?p=7" && u.additional == "Gallery"));
    }
}

#[test]
fn duplicates_are_kept_in_encounter_order() {
    let body = format!("{}{}{}", fig("A1"), fig("Z9"), fig("A1"));
    let item = ContentItem::new("u1", "Dupes", body);
    let ids: Vec<String> = scan_items([&item])
        .usages
        .into_iter()
        .map(|u| u.asset_id)
        .collect();
    assert_eq!(ids, vec!["A1", "Z9", "A1"]);
}

#[test]
fn three_item_example_payload() {
    let items = vec![
        ContentItem::new("u-a", "Two of A1", format!("{}<p>text</p>{}", fig("A1"), fig("A1"))),
        ContentItem::new("u-b", "One B2", fig("B2")),
        ContentItem::new("u-c", "Nothing", "<p>plain</p>"),
    ];
    let payload = scan_items(&items).into_payload();

    assert_eq!(payload.integration_id, INTEGRATION_ID);
    assert_eq!(payload.uris, vec!["u-a", "u-b", "u-c"]);
    assert_eq!(payload.usages.len(), 3);
    assert_eq!(payload.usages.iter().filter(|u| u.asset_id == "A1").count(), 2);
    assert_eq!(payload.usages.iter().filter(|u| u.asset_id == "B2").count(), 1);
    assert_eq!(
        payload.usages[2],
        AssetReference {
            asset_id: "B2".into(),
            uri: "u-b".into(),
            additional: "One B2".into(),
        }
    );
}

#[test]
fn payload_json_round_trip_keeps_empty_usages() {
    let items = vec![ContentItem::new("u-1", "a", ""), ContentItem::new("u-2", "b", "")];
    let payload = scan_items(&items).into_payload();
    let json = serde_json::to_string(&payload).unwrap();
    assert!(json.contains(r#""usages":[]"#));

    let back: UsageSyncPayload = serde_json::from_str(&json).unwrap();
    assert_eq!(back, payload);
}

#[test]
fn markup_saved_by_blocks_is_found_by_the_scanner() {
    let settings = PortalSettings::default();
    let image: SelectedAsset = serde_json::from_value(serde_json::json!({
        "databaseId": "IMG-1", "name": "Hero", "type": "IMAGE",
        "files": {"webImage": {"url": "https://cdn.test/hero.jpg"}}
    }))
    .unwrap();
    let doc = SelectedAsset {
        database_id: "DOC-1".into(),
        name: "Spec sheet".into(),
        asset_type: AssetType::Document,
        files: [(
            "original".to_string(),
            AssetFile {
                url: "https://cdn.test/datasheet.pdf".into(),
            },
        )]
        .into_iter()
        .collect(),
        preview_urls: vec![],
    };

    let body = [&image, &doc]
        .iter()
        .map(|a| block_for_asset(a, &settings, None).unwrap().to_markup())
        .collect::<Vec<_>>()
        .join("\n");
    let item = ContentItem::new("https://site.test/launch", "Launch", body);

    let ids: Vec<String> = scan_items([&item])
        .usages
        .into_iter()
        .map(|u| u.asset_id)
        .collect();
    assert_eq!(ids, vec!["IMG-1", "DOC-1"]);
}

#[test]
fn gallery_markup_yields_one_usage_per_image_in_order() {
    let picked: Vec<SelectedAsset> = serde_json::from_value(serde_json::json!([
        {"databaseId": "G-1", "name": "One", "type": "IMAGE",
         "files": {"webImage": {"url": "https://cdn.test/1.jpg"}}},
        {"databaseId": "DOC-9", "name": "Manual", "type": "DOCUMENT",
         "files": {"original": {"url": "https://cdn.test/m.pdf"}}},
        {"databaseId": "G-2", "name": "Two", "type": "IMAGE",
         "files": {"webImage": {"url": "https://cdn.test/2.jpg"}}},
        {"databaseId": "G-3", "name": "Three", "type": "IMAGE",
         "files": {"webImage": {"url": "https://cdn.test/3.jpg"}}}
    ]))
    .unwrap();

    let gallery = gallery_for_assets(&picked, &PortalSettings::default()).unwrap();
    let item = ContentItem::new("https://site.test/gallery", "Gallery", gallery.to_markup());
    let usages = scan_items([&item]).usages;

    let ids: Vec<&str> = usages.iter().map(|u| u.asset_id.as_str()).collect();
    assert_eq!(ids, vec!["G-1", "G-2", "G-3"]);
    assert!(usages.iter().all(|u| u.uri == "https://site.test/gallery"));
}
