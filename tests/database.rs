//! Database backed tests. They need a Postgres `DATABASE_URL` and are
//! skipped unless run with `cargo test -- --ignored`.

use foodgram_sdk::{
    actions::*,
    draft::{IngredientAmount, RecipeDraft},
    error::{Error, ValidationError},
    permissions::Identity,
    schema::{Id, RecipeFilter},
};
use sqlx::PgPool;

async fn insert_user(name: &str, pool: &PgPool) -> Id {
    let row: (Id,) =
        sqlx::query_as("INSERT INTO users (email, username) VALUES ($1, $2) RETURNING id")
            .bind(format!("{name}@example.com"))
            .bind(name)
            .fetch_one(pool)
            .await
            .unwrap();
    row.0
}

async fn count(table: &str, pool: &PgPool) -> i64 {
    let row: (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(pool)
        .await
        .unwrap();
    row.0
}

fn draft(tags: Vec<Id>, ingredients: &[(Id, i32)]) -> RecipeDraft {
    RecipeDraft {
        name: String::from("Pancakes"),
        text: String::from("Mix and fry."),
        cooking_time: 20,
        image: Some(String::from("recipes/images/pancakes.png")),
        tags,
        ingredients: ingredients
            .iter()
            .map(|(id, amount)| IngredientAmount {
                id: *id,
                amount: *amount,
            })
            .collect(),
    }
}

struct Kitchen {
    author: Id,
    tag: Id,
    flour: Id,
    milk: Id,
}

async fn kitchen(pool: &PgPool) -> Kitchen {
    let author = insert_user("author", pool).await;
    let tag = create_tag("Breakfast", "#E26C2D", "breakfast", pool)
        .await
        .unwrap();
    let flour = create_ingredient("Flour", "g", pool).await.unwrap();
    let milk = create_ingredient("Milk", "ml", pool).await.unwrap();
    Kitchen {
        author,
        tag,
        flour,
        milk,
    }
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn create_recipe_writes_all_associations(pool: PgPool) {
    let k = kitchen(&pool).await;

    let recipe = create_recipe(
        Identity::User(k.author),
        draft(vec![k.tag, k.tag], &[(k.flour, 200), (k.milk, 300)]),
        &pool,
    )
    .await
    .unwrap();

    assert_eq!(recipe.author_id, k.author);
    assert_eq!(count("recipe_ingredients", &pool).await, 2);
    assert_eq!(count("recipe_tags", &pool).await, 1);

    let detail = get_recipe_detail(Identity::Anonymous, recipe.id, &pool)
        .await
        .unwrap();
    assert_eq!(detail.ingredients.len(), 2);
    assert_eq!(detail.tags[0].slug, "breakfast");
    assert!(!detail.is_favorited);
    assert!(!detail.author.is_subscribed);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn rejected_drafts_write_nothing(pool: PgPool) {
    let k = kitchen(&pool).await;
    let author = Identity::User(k.author);

    let error = create_recipe(author, draft(vec![k.tag], &[(k.flour, 2), (k.flour, 0)]), &pool)
        .await
        .unwrap_err();
    assert!(matches!(
        error,
        Error::Validation(ValidationError::DuplicateIngredient(_))
    ));

    let error = create_recipe(author, draft(vec![k.tag], &[(9999, 5)]), &pool)
        .await
        .unwrap_err();
    assert!(matches!(error, Error::Validation(ValidationError::Field { .. })));

    let error = create_recipe(Identity::Anonymous, draft(vec![k.tag], &[]), &pool)
        .await
        .unwrap_err();
    assert!(matches!(error, Error::Unauthorized));

    assert_eq!(count("recipes", &pool).await, 0);
    assert_eq!(count("recipe_ingredients", &pool).await, 0);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn update_replaces_associations_and_is_idempotent(pool: PgPool) {
    let k = kitchen(&pool).await;
    let author = Identity::User(k.author);
    let recipe = create_recipe(author, draft(vec![k.tag], &[(k.flour, 200), (k.milk, 300)]), &pool)
        .await
        .unwrap();

    let mut replacement = draft(vec![k.tag], &[(k.milk, 50)]);
    replacement.image = None;
    for _ in 0..2 {
        update_recipe(author, recipe.id, replacement.clone(), &pool)
            .await
            .unwrap();
    }

    let lines = list_recipe_ingredients(recipe.id, &pool).await.unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].amount, 50);
    assert_eq!(count("recipe_tags", &pool).await, 1);

    let stored = get_recipe(recipe.id, &pool).await.unwrap().unwrap();
    assert_eq!(stored.image, recipe.image);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn only_the_author_may_change_a_recipe(pool: PgPool) {
    let k = kitchen(&pool).await;
    let stranger = insert_user("stranger", &pool).await;
    let recipe = create_recipe(Identity::User(k.author), draft(vec![k.tag], &[]), &pool)
        .await
        .unwrap();

    let error = delete_recipe(Identity::User(stranger), recipe.id, &pool)
        .await
        .unwrap_err();
    assert!(matches!(error, Error::Forbidden(_)));

    delete_recipe(Identity::User(k.author), recipe.id, &pool)
        .await
        .unwrap();
    assert!(get_recipe(recipe.id, &pool).await.unwrap().is_none());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn favorites_toggle_once_each_way(pool: PgPool) {
    let k = kitchen(&pool).await;
    let reader = Identity::User(insert_user("reader", &pool).await);
    let recipe = create_recipe(Identity::User(k.author), draft(vec![k.tag], &[]), &pool)
        .await
        .unwrap();

    let summary = add_to_favorites(reader, recipe.id, &pool).await.unwrap();
    assert_eq!(summary.id, recipe.id);
    assert!(matches!(
        add_to_favorites(reader, recipe.id, &pool).await,
        Err(Error::AlreadyExists(_))
    ));
    assert_eq!(count("favorites", &pool).await, 1);

    let filter = RecipeFilter {
        is_favorited: true,
        ..RecipeFilter::default()
    };
    let listed = list_recipes(reader, &filter, &pool).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert!(listed[0].is_favorited);

    remove_from_favorites(reader, recipe.id, &pool).await.unwrap();
    assert!(matches!(
        remove_from_favorites(reader, recipe.id, &pool).await,
        Err(Error::AssociationNotFound(_))
    ));
    assert!(matches!(
        add_to_favorites(reader, 9999, &pool).await,
        Err(Error::NotFound(_))
    ));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn self_subscription_is_refused(pool: PgPool) {
    let user = insert_user("lonely", &pool).await;

    assert!(matches!(
        subscribe(Identity::User(user), user, &pool).await,
        Err(Error::SelfSubscription)
    ));

    let error = sqlx::query("INSERT INTO subscriptions (user_id, author_id) VALUES ($1, $1)")
        .bind(user)
        .execute(&pool)
        .await
        .unwrap_err();
    assert!(matches!(Error::from(error), Error::SelfSubscription));
    assert_eq!(count("subscriptions", &pool).await, 0);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn concurrent_subscriptions_store_one_row(pool: PgPool) {
    let author = insert_user("author", &pool).await;
    let follower = Identity::User(insert_user("follower", &pool).await);

    let (first, second) = tokio::join!(
        subscribe(follower, author, &pool),
        subscribe(follower, author, &pool)
    );

    let results = [first, second];
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results
        .iter()
        .any(|r| matches!(r, Err(Error::AlreadyExists(_)))));
    assert_eq!(count("subscriptions", &pool).await, 1);

    let subscriptions = list_subscriptions(follower, Some(1), &pool).await.unwrap();
    assert_eq!(subscriptions.len(), 1);
    assert!(subscriptions[0].author.is_subscribed);

    unsubscribe(follower, author, &pool).await.unwrap();
    assert!(matches!(
        unsubscribe(follower, author, &pool).await,
        Err(Error::AssociationNotFound(_))
    ));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn shopping_list_sums_across_cart_recipes(pool: PgPool) {
    let k = kitchen(&pool).await;
    let author = Identity::User(k.author);

    let pancakes = create_recipe(author, draft(vec![k.tag], &[(k.flour, 200), (k.milk, 100)]), &pool)
        .await
        .unwrap();
    let bread = create_recipe(author, draft(vec![k.tag], &[(k.flour, 300)]), &pool)
        .await
        .unwrap();
    add_to_shopping_cart(author, pancakes.id, &pool).await.unwrap();
    add_to_shopping_cart(author, bread.id, &pool).await.unwrap();

    let list = shopping_list_for(author, &pool).await.unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list.entries[0].name, "Flour");
    assert_eq!(list.entries[0].amount, 500);
    assert_eq!(list.entries[1].name, "Milk");
    assert_eq!(list.entries[1].amount, 100);

    let empty = shopping_list_for(Identity::User(insert_user("nobody", &pool).await), &pool)
        .await
        .unwrap();
    assert!(empty.is_empty());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn ingredient_search_is_a_case_insensitive_prefix(pool: PgPool) {
    create_ingredient("Flour", "g", &pool).await.unwrap();
    create_ingredient("flax seeds", "g", &pool).await.unwrap();
    create_ingredient("Sunflower oil", "ml", &pool).await.unwrap();

    let found = list_ingredients(Some("FL"), &pool).await.unwrap();
    let names: Vec<_> = found.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names.len(), 2);
    assert!(!names.contains(&"Sunflower oil"));

    assert_eq!(seed_tags(&pool).await.unwrap(), 3);
    assert_eq!(seed_tags(&pool).await.unwrap(), 0);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn only_the_author_may_update_a_recipe(pool: PgPool) {
    let k = kitchen(&pool).await;
    let stranger = Identity::User(insert_user("stranger", &pool).await);
    let recipe = create_recipe(Identity::User(k.author), draft(vec![k.tag], &[(k.flour, 10)]), &pool)
        .await
        .unwrap();

    let mut takeover = draft(vec![k.tag], &[(k.milk, 1)]);
    takeover.name = String::from("Not yours");
    let error = update_recipe(stranger, recipe.id, takeover, &pool)
        .await
        .unwrap_err();
    assert!(matches!(error, Error::Forbidden(_)));

    let stored = get_recipe(recipe.id, &pool).await.unwrap().unwrap();
    assert_eq!(stored.name, "Pancakes");
    let lines = list_recipe_ingredients(recipe.id, &pool).await.unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].id, k.flour);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn shopping_cart_toggles_once_each_way(pool: PgPool) {
    let k = kitchen(&pool).await;
    let shopper = Identity::User(insert_user("shopper", &pool).await);
    let recipe = create_recipe(Identity::User(k.author), draft(vec![k.tag], &[]), &pool)
        .await
        .unwrap();

    add_to_shopping_cart(shopper, recipe.id, &pool).await.unwrap();
    assert!(matches!(
        add_to_shopping_cart(shopper, recipe.id, &pool).await,
        Err(Error::AlreadyExists(_))
    ));
    assert_eq!(count("shopping_cart", &pool).await, 1);

    remove_from_shopping_cart(shopper, recipe.id, &pool)
        .await
        .unwrap();
    assert!(matches!(
        remove_from_shopping_cart(shopper, recipe.id, &pool).await,
        Err(Error::AssociationNotFound(_))
    ));
    assert_eq!(count("shopping_cart", &pool).await, 0);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn deleted_ingredients_drop_out_of_the_shopping_list(pool: PgPool) {
    let k = kitchen(&pool).await;
    let author = Identity::User(k.author);
    let recipe = create_recipe(author, draft(vec![k.tag], &[(k.flour, 200), (k.milk, 100)]), &pool)
        .await
        .unwrap();
    add_to_shopping_cart(author, recipe.id, &pool).await.unwrap();

    sqlx::query("DELETE FROM ingredients WHERE id = $1")
        .bind(k.milk)
        .execute(&pool)
        .await
        .unwrap();

    let orphans: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM recipe_ingredients WHERE recipe_id = $1 AND ingredient_id IS NULL",
    )
    .bind(recipe.id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(orphans.0, 1);

    let list = shopping_list_for(author, &pool).await.unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list.entries[0].name, "Flour");
    assert_eq!(list.entries[0].amount, 200);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn subscribing_to_a_missing_author_is_not_found(pool: PgPool) {
    let follower = Identity::User(insert_user("follower", &pool).await);

    assert!(matches!(
        subscribe(follower, 9999, &pool).await,
        Err(Error::NotFound(_))
    ));
    assert!(matches!(
        unsubscribe(follower, 9999, &pool).await,
        Err(Error::NotFound(_))
    ));
    assert_eq!(count("subscriptions", &pool).await, 0);
}
