//! Menu service behaviour end to end against the in-memory store.

use std::sync::Arc;

use cms_core::domain::{MenuInput, MenuItemInput};
use cms_core::error::DomainError;
use cms_core::repositories::MenuRepository;
use cms_core::services::MenuService;
use cms_core::tree::{ReorderNode, MenuExport};
use cms_infrastructure::InMemoryMenuRepository;
use cms_shared::config::MenuSettings;
use cms_shared::{EntityId, SortScheme};

fn service_with(repo: Arc<InMemoryMenuRepository>) -> MenuService<InMemoryMenuRepository> {
    MenuService::new(
        repo,
        MenuSettings {
            sort_scheme: SortScheme::Leveled,
            max_depth: 5,
        },
    )
}

fn service() -> (Arc<InMemoryMenuRepository>, MenuService<InMemoryMenuRepository>) {
    let repo = Arc::new(InMemoryMenuRepository::new());
    (repo.clone(), service_with(repo))
}

fn shape(nodes: &[cms_core::tree::MenuNode]) -> Vec<ReorderNode> {
    ReorderNode::from_nodes(nodes)
}

#[tokio::test]
async fn test_home_about_scenario() {
    let (_, service) = service();
    let menu = service.create_menu(MenuInput::new("main", None)).await.unwrap();

    let home = service
        .add_item(menu.id, MenuItemInput::new("Home", "/"))
        .await
        .unwrap();
    assert_eq!(home.sort_order, 1);
    assert!(home.parent_id.is_none());

    let about = service
        .add_item(menu.id, MenuItemInput::new("About", "/about").with_parent(home.id))
        .await
        .unwrap();
    assert_eq!(about.sort_order, 1);
    assert_eq!(about.parent_id, Some(home.id));

    let detail = service.get_menu(menu.id).await.unwrap();
    assert_eq!(detail.items.len(), 1);
    assert_eq!(detail.items[0].children[0].item.id, about.id);

    let payload = vec![ReorderNode::leaf(home.id), ReorderNode::leaf(about.id)];
    service.reorder_items(menu.id, &payload).await.unwrap();

    let detail = service.get_menu(menu.id).await.unwrap();
    let roots: Vec<(EntityId, i32, Option<EntityId>)> = detail
        .items
        .iter()
        .map(|n| (n.item.id, n.item.sort_order, n.item.parent_id))
        .collect();
    assert_eq!(roots, vec![(home.id, 1, None), (about.id, 2, None)]);
}

#[tokio::test]
async fn test_rebuilt_tree_matches_reorder_payload() {
    let (_, service) = service();
    let menu = service.create_menu(MenuInput::new("main", None)).await.unwrap();
    let mut ids = Vec::new();
    for label in ["Home", "Galleries", "Portraits", "Landscapes", "Contact"] {
        let item = service
            .add_item(menu.id, MenuItemInput::new(label, format!("/{}", label.to_lowercase())))
            .await
            .unwrap();
        ids.push(item.id);
    }

    let payload = vec![
        ReorderNode::with_children(
            ids[1],
            vec![
                ReorderNode::leaf(ids[3]),
                ReorderNode::with_children(ids[2], vec![ReorderNode::leaf(ids[4])]),
            ],
        ),
        ReorderNode::leaf(ids[0]),
    ];
    let changed = service.reorder_items(menu.id, &payload).await.unwrap();
    assert_eq!(changed, 5);

    let detail = service.get_menu(menu.id).await.unwrap();
    assert_eq!(shape(&detail.items), payload);
    assert!(detail.orphans.is_empty());
}

#[tokio::test]
async fn test_duplicate_survives_original_delete() {
    let (repo, service) = service();
    let menu = service.create_menu(MenuInput::new("main", None)).await.unwrap();
    let a = service.add_item(menu.id, MenuItemInput::new("A", "/a")).await.unwrap();
    let b = service
        .add_item(menu.id, MenuItemInput::new("B", "/b").with_parent(a.id))
        .await
        .unwrap();

    let copy = service.duplicate_menu(menu.id, "main copy").await.unwrap();
    assert_ne!(copy.id, menu.id);

    service.delete_menu(menu.id).await.unwrap();

    let detail = service.get_menu(copy.id).await.unwrap();
    assert_eq!(detail.items.len(), 1);
    let a_copy = &detail.items[0];
    let b_copy = &a_copy.children[0];
    assert_eq!(a_copy.item.label, "A");
    assert_eq!(b_copy.item.label, "B");
    assert_eq!(b_copy.item.parent_id, Some(a_copy.item.id));
    assert!(![a.id, b.id].contains(&a_copy.item.id));
    assert!(![a.id, b.id].contains(&b_copy.item.id));
    assert_eq!(repo.count_items(copy.id).await.unwrap(), 2);
}

#[tokio::test]
async fn test_duplicate_name_must_be_free() {
    let (_, service) = service();
    let menu = service.create_menu(MenuInput::new("main", None)).await.unwrap();
    service.create_menu(MenuInput::new("footer", None)).await.unwrap();
    let err = service.duplicate_menu(menu.id, "Footer").await.unwrap_err();
    assert!(matches!(err, DomainError::MenuNameAlreadyExists(_)));
}

#[tokio::test]
async fn test_subtree_delete_leaves_siblings() {
    let (repo, service) = service();
    let menu = service.create_menu(MenuInput::new("main", None)).await.unwrap();
    let galleries = service
        .add_item(menu.id, MenuItemInput::new("Galleries", "/galleries"))
        .await
        .unwrap();
    let portraits = service
        .add_item(menu.id, MenuItemInput::new("Portraits", "/p").with_parent(galleries.id))
        .await
        .unwrap();
    let studio = service
        .add_item(menu.id, MenuItemInput::new("Studio", "/p/studio").with_parent(portraits.id))
        .await
        .unwrap();
    let contact = service
        .add_item(menu.id, MenuItemInput::new("Contact", "/contact"))
        .await
        .unwrap();

    let removed = service.delete_item(menu.id, galleries.id).await.unwrap();
    assert_eq!(removed.last(), Some(&galleries.id));
    assert!(removed.contains(&portraits.id));
    assert!(removed.contains(&studio.id));

    assert!(repo.find_item(contact.id).await.unwrap().is_some());
    assert!(repo.find_item(studio.id).await.unwrap().is_none());
    assert!(service.get_menu(menu.id).await.is_ok());
    assert_eq!(repo.count_items(menu.id).await.unwrap(), 1);
}

#[tokio::test]
async fn test_deleted_menu_is_not_found() {
    let (repo, service) = service();
    let menu = service.create_menu(MenuInput::new("main", None)).await.unwrap();
    service.add_item(menu.id, MenuItemInput::new("Home", "/")).await.unwrap();
    service.add_item(menu.id, MenuItemInput::new("Blog", "/blog")).await.unwrap();

    assert_eq!(service.delete_menu(menu.id).await.unwrap(), 2);
    assert_eq!(repo.count_items(menu.id).await.unwrap(), 0);
    assert!(matches!(
        service.get_menu(menu.id).await,
        Err(DomainError::MenuNotFound(_))
    ));
    assert!(matches!(
        service.delete_menu(menu.id).await,
        Err(DomainError::MenuNotFound(_))
    ));
}

#[tokio::test]
async fn test_failed_reorder_leaves_no_partial_state() {
    let (repo, service) = service();
    let menu = service.create_menu(MenuInput::new("main", None)).await.unwrap();
    let home = service.add_item(menu.id, MenuItemInput::new("Home", "/")).await.unwrap();
    let blog = service.add_item(menu.id, MenuItemInput::new("Blog", "/blog")).await.unwrap();
    let before = repo.list_items(menu.id).await.unwrap();

    repo.inject_failure_after(1);
    let payload = vec![ReorderNode::with_children(blog.id, vec![ReorderNode::leaf(home.id)])];
    let err = service.reorder_items(menu.id, &payload).await.unwrap_err();
    assert!(matches!(err, DomainError::DatabaseError(_)));
    assert_eq!(repo.list_items(menu.id).await.unwrap(), before);
}

#[tokio::test]
async fn test_moving_item_under_its_descendant_is_rejected() {
    let (_, service) = service();
    let menu = service.create_menu(MenuInput::new("main", None)).await.unwrap();
    let parent = service.add_item(menu.id, MenuItemInput::new("Parent", "/p")).await.unwrap();
    let child = service
        .add_item(menu.id, MenuItemInput::new("Child", "/c").with_parent(parent.id))
        .await
        .unwrap();

    let err = service
        .update_item(menu.id, parent.id, MenuItemInput::new("Parent", "/p").with_parent(child.id))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::CircularReference { .. }));
}

#[tokio::test]
async fn test_parent_from_other_menu_is_rejected() {
    let (_, service) = service();
    let main = service.create_menu(MenuInput::new("main", None)).await.unwrap();
    let footer = service.create_menu(MenuInput::new("footer", None)).await.unwrap();
    let imprint = service
        .add_item(footer.id, MenuItemInput::new("Imprint", "/imprint"))
        .await
        .unwrap();

    let err = service
        .add_item(main.id, MenuItemInput::new("Home", "/").with_parent(imprint.id))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::InvalidParent { .. }));
}

#[tokio::test]
async fn test_export_then_import_copies_tree() {
    let (_, service) = service();
    let menu = service
        .create_menu(MenuInput::new("main", Some("Primary navigation".to_string())))
        .await
        .unwrap();
    let galleries = service
        .add_item(menu.id, MenuItemInput::new("Galleries", "/galleries"))
        .await
        .unwrap();
    service
        .add_item(
            menu.id,
            MenuItemInput::new("Shop", "https://prints.example")
                .with_parent(galleries.id)
                .with_target("_blank"),
        )
        .await
        .unwrap();

    let export = service.export_menu(menu.id).await.unwrap();
    let json = serde_json::to_string(&export).unwrap();
    let document: MenuExport = serde_json::from_str(&json).unwrap();

    let imported = service
        .import_menu(document, Some("main restored".to_string()))
        .await
        .unwrap();
    assert_eq!(imported.description.as_deref(), Some("Primary navigation"));

    let detail = service.get_menu(imported.id).await.unwrap();
    assert_eq!(detail.items[0].item.label, "Galleries");
    assert_eq!(detail.items[0].children[0].item.target, "_blank");
    assert_eq!(detail.items[0].children[0].item.sort_order, 101);
}
