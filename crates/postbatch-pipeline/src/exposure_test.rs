use std::sync::Arc;

use super::*;
use crate::fakes::MemoryStore;
use crate::ports::{AccessLevel, Permission};

const TEMPLATE: &str = "https://files.example/download?id={id}";

fn manager(store: &Arc<MemoryStore>, image_root: Option<&str>) -> ExposureManager {
    ExposureManager::new(store.clone(), image_root.map(str::to_string), TEMPLATE)
}

#[test]
fn share_urls_yield_their_id() {
    assert_eq!(
        id_from_url("https://drive.google.com/file/d/1AbC_dEf-123/view?usp=sharing").as_deref(),
        Some("1AbC_dEf-123")
    );
    assert_eq!(
        id_from_url("https://docs.google.com/document/d/XyZ987/edit").as_deref(),
        Some("XyZ987")
    );
    assert_eq!(
        id_from_url("https://drive.google.com/open?id=Qwerty_12").as_deref(),
        Some("Qwerty_12")
    );
    assert_eq!(id_from_url("https://example.com/photo.jpg"), None);
    assert_eq!(id_from_url("images/d/photo.jpg"), None);
}

#[tokio::test]
async fn resolves_url_reference_known_to_store() {
    let store = Arc::new(MemoryStore::new());
    store.add_file_with_id("abc123", &store.root(), "latte.jpg", "image/jpeg");

    let id = manager(&store, None)
        .resolve_asset("https://drive.google.com/file/d/abc123/view")
        .await
        .unwrap();
    assert_eq!(id.as_deref(), Some("abc123"));
}

#[tokio::test]
async fn url_with_unknown_id_is_asset_not_found() {
    let store = Arc::new(MemoryStore::new());
    let reference = "https://drive.google.com/file/d/gone456/view";

    let err = manager(&store, None).acquire(reference).await.unwrap_err();

    assert!(matches!(err, ExposureError::AssetNotFound(r) if r == reference));
}

#[tokio::test]
async fn resolves_bare_id_known_to_store() {
    let store = Arc::new(MemoryStore::new());
    let known = "1aB2cD3eF4gH5iJ6kL7mN8";
    store.add_file_with_id(known, &store.root(), "latte.jpg", "image/jpeg");

    let exposure = manager(&store, None);
    assert_eq!(
        exposure.resolve_asset(known).await.unwrap().as_deref(),
        Some(known)
    );
    assert_eq!(
        exposure
            .resolve_asset("ZZZZZZZZZZZZZZZZZZZZZZZZ")
            .await
            .unwrap(),
        None
    );
}

#[tokio::test]
async fn resolves_paths_from_image_root() {
    let store = Arc::new(MemoryStore::new());
    let images = store.add_folder(&store.root(), "images");
    let drinks = store.add_folder(&images, "drinks");
    let latte = store.add_file(&drinks, "latte.jpg", "image/jpeg", None);

    let from_root = manager(&store, None);
    assert_eq!(
        from_root
            .resolve_asset("images/drinks/latte.jpg")
            .await
            .unwrap()
            .as_deref(),
        Some(latte.as_str())
    );

    let from_images = manager(&store, Some(&images));
    assert_eq!(
        from_images
            .resolve_asset("/drinks//latte.jpg")
            .await
            .unwrap()
            .as_deref(),
        Some(latte.as_str())
    );
    assert_eq!(
        from_images.resolve_asset("drinks/mocha.jpg").await.unwrap(),
        None
    );
}

#[tokio::test]
async fn acquire_and_restore_round_trip_sharing() {
    let store = Arc::new(MemoryStore::new());
    let image = store.add_file(&store.root(), "latte.jpg", "image/jpeg", None);
    let original = Sharing {
        access: AccessLevel::Private,
        permission: Permission::Edit,
    };
    store.set_initial_sharing(&image, original);

    let exposure = manager(&store, None);
    let handle = exposure.acquire("latte.jpg").await.unwrap();

    assert_eq!(handle.asset_id(), image);
    assert_eq!(handle.original_sharing(), original);
    assert_eq!(
        handle.public_url(),
        format!("https://files.example/download?id={image}")
    );
    assert_eq!(store.sharing_of(&image), Sharing::PUBLIC_VIEW);

    exposure.restore(Some(handle)).await;
    assert_eq!(store.sharing_of(&image), original);
}

#[tokio::test]
async fn restore_none_is_a_noop() {
    let store = Arc::new(MemoryStore::new());
    manager(&store, None).restore(None).await;
}

#[tokio::test]
async fn unresolved_reference_is_asset_not_found() {
    let store = Arc::new(MemoryStore::new());
    let err = manager(&store, None)
        .acquire("images/missing.jpg")
        .await
        .unwrap_err();
    assert!(matches!(err, ExposureError::AssetNotFound(r) if r == "images/missing.jpg"));
}

#[tokio::test]
async fn failed_elevation_is_a_store_error() {
    let store = Arc::new(MemoryStore::new());
    let image = store.add_file(&store.root(), "latte.jpg", "image/jpeg", None);
    store.fail_set_sharing();

    let err = manager(&store, None).acquire("latte.jpg").await.unwrap_err();

    assert!(matches!(err, ExposureError::Store { .. }));
    assert_eq!(store.sharing_of(&image), Sharing::default());
}

#[tokio::test]
async fn with_exposure_restores_after_success() {
    let store = Arc::new(MemoryStore::new());
    let image = store.add_file(&store.root(), "latte.jpg", "image/jpeg", None);
    let exposure = manager(&store, None);

    let seen = exposure
        .with_exposure("latte.jpg", |url| async move {
            Ok::<_, ExposureError>(url)
        })
        .await
        .unwrap();

    assert!(seen.ends_with(&image));
    assert_eq!(
        store.sharing_history(&image),
        [Sharing::PUBLIC_VIEW, Sharing::default()]
    );
}

#[tokio::test]
async fn with_exposure_restores_after_failure() {
    #[derive(Debug)]
    enum TaskError {
        Exposure,
        Rejected,
    }

    impl From<ExposureError> for TaskError {
        fn from(_: ExposureError) -> Self {
            TaskError::Exposure
        }
    }

    let store = Arc::new(MemoryStore::new());
    let image = store.add_file(&store.root(), "latte.jpg", "image/jpeg", None);
    let exposure = manager(&store, None);

    let result: Result<(), TaskError> = exposure
        .with_exposure("latte.jpg", |_url| async { Err(TaskError::Rejected) })
        .await;

    assert!(matches!(result, Err(TaskError::Rejected)));
    assert_eq!(store.sharing_of(&image), Sharing::default());
    assert_eq!(store.sharing_history(&image).len(), 2);

    let missing: Result<(), TaskError> = exposure
        .with_exposure("nope.jpg", |_url| async { Ok(()) })
        .await;
    assert!(matches!(missing, Err(TaskError::Exposure)));
}
