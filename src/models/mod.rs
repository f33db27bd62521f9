pub mod client;
pub mod order;
pub mod recipe;

// Re-export only the types we actually use
pub use client::{Client, CreateClient};
pub use order::{order_total, NewOrder, Order, OrderChanges, OrderDraft, OrderItem, OrderStatus};
pub use recipe::{CreateRecipe, CreateRecipeCategory, Recipe, RecipeCategory};
