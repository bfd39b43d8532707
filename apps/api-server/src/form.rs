//! Recipe request bodies: multipart forms (with an optional image) or JSON.

use actix_multipart::{Field, Multipart, MultipartError};
use actix_web::{FromRequest, HttpMessage, HttpRequest, dev::Payload, web};
use futures::TryStreamExt;
use futures::future::LocalBoxFuture;

use kitchen_core::upload::{IMAGE_FIELD, ImageUpload, UploadValidator};
use kitchen_core::validation::{IngredientsInput, RecipeInput};
use kitchen_shared::dto::{IngredientsField, RecipeRequest};

use crate::middleware::error::AppError;
use crate::state::AppState;

/// Ceiling for any non-file form field.
pub const MAX_TEXT_FIELD_BYTES: usize = 64 * 1024;

/// Recipe fields plus the image, if one was attached.
#[derive(Debug)]
pub struct RecipeForm {
    pub input: RecipeInput,
    pub image: Option<ImageUpload>,
}

impl FromRequest for RecipeForm {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        if req.content_type() == "application/json" {
            let body = web::Json::<RecipeRequest>::from_request(req, payload);
            return Box::pin(async move {
                let body = body
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Invalid JSON body: {}", e)))?;
                Ok(RecipeForm {
                    input: from_json(body.into_inner()),
                    image: None,
                })
            });
        }

        let uploads = req
            .app_data::<web::Data<AppState>>()
            .map(|state| state.recipes.upload_validator().clone())
            .unwrap_or_default();
        let multipart = Multipart::new(req.headers(), payload.take());

        Box::pin(read_multipart(multipart, uploads))
    }
}

fn from_json(body: RecipeRequest) -> RecipeInput {
    RecipeInput {
        name: body.name,
        description: body.description,
        ingredients: body.ingredients.map(|field| match field {
            IngredientsField::List(items) => IngredientsInput::List(items),
            IngredientsField::Text(text) => IngredientsInput::Text(text),
        }),
        steps: body.steps,
        servings: body.servings.map(|n| n.to_string()),
        cooking_time: body.cooking_time.map(|n| n.to_string()),
        cuisine_type: body.cuisine_type,
        recipe_type: body.recipe_type,
        difficulty: body.difficulty,
    }
}

fn malformed(err: MultipartError) -> AppError {
    AppError::BadRequest(format!("Malformed form data: {}", err))
}

async fn read_multipart(
    mut multipart: Multipart,
    uploads: UploadValidator,
) -> Result<RecipeForm, AppError> {
    let mut input = RecipeInput::default();
    let mut ingredients: Vec<String> = Vec::new();
    let mut ingredients_as_list = false;
    let mut image = None;

    while let Some(field) = multipart.try_next().await.map_err(malformed)? {
        let name = field.name().unwrap_or_default().to_string();

        if name == IMAGE_FIELD {
            if image.is_some() {
                return Err(AppError::BadRequest(
                    "Only one image may be uploaded".to_string(),
                ));
            }
            image = read_image(field, &uploads).await?;
            continue;
        }

        let value = read_text(field, &name).await?;
        match name.as_str() {
            "name" => input.name = Some(value),
            "description" => input.description = Some(value),
            "ingredients" => ingredients.push(value),
            "ingredients[]" => {
                ingredients_as_list = true;
                ingredients.push(value);
            }
            "steps" => input.steps = Some(value),
            "servings" => input.servings = Some(value),
            "cookingTime" => input.cooking_time = Some(value),
            "cuisineType" => input.cuisine_type = Some(value),
            "recipeType" => input.recipe_type = Some(value),
            "difficulty" => input.difficulty = Some(value),
            other => tracing::debug!(field = other, "Ignoring unknown form field"),
        }
    }

    // A single `ingredients` part is text to normalize; repeated parts are already a list.
    input.ingredients = match ingredients.len() {
        0 => None,
        1 if !ingredients_as_list => ingredients.pop().map(IngredientsInput::Text),
        _ => Some(IngredientsInput::List(ingredients)),
    };

    Ok(RecipeForm { input, image })
}

async fn read_text(mut field: Field, name: &str) -> Result<String, AppError> {
    let mut buf = Vec::new();
    while let Some(chunk) = field.try_next().await.map_err(malformed)? {
        if buf.len() + chunk.len() > MAX_TEXT_FIELD_BYTES {
            return Err(AppError::BadRequest(format!("Field '{}' is too large", name)));
        }
        buf.extend_from_slice(&chunk);
    }

    String::from_utf8(buf)
        .map_err(|_| AppError::BadRequest(format!("Field '{}' is not valid UTF-8", name)))
}

/// Stream the image part, rejecting as soon as it is known to be unacceptable.
async fn read_image(
    mut field: Field,
    uploads: &UploadValidator,
) -> Result<Option<ImageUpload>, AppError> {
    let file_name = field
        .content_disposition()
        .and_then(|cd| cd.get_filename())
        .map(str::to_owned);

    let content_type = field
        .content_type()
        .map(|mime| mime.essence_str().to_owned());

    // Browsers send an empty, nameless part when no file was chosen; a plain
    // text part carries neither a file name nor a content type.
    let no_file = match (&file_name, &content_type) {
        (Some(name), _) => name.is_empty(),
        (None, content_type) => content_type.is_none(),
    };
    if no_file {
        while field.try_next().await.map_err(malformed)?.is_some() {}
        return Ok(None);
    }

    let content_type = content_type.unwrap_or_default();
    uploads.check_content_type(&content_type)?;

    let mut bytes = Vec::new();
    while let Some(chunk) = field.try_next().await.map_err(malformed)? {
        uploads.check_size(bytes.len() + chunk.len())?;
        bytes.extend_from_slice(&chunk);
    }

    Ok(Some(ImageUpload {
        file_name,
        content_type,
        bytes,
    }))
}

#[cfg(test)]
mod tests {
    use actix_web::test::TestRequest;

    use super::*;

    const BOUNDARY: &str = "----kitchen-boundary";

    fn part(name: &str, value: &str) -> String {
        format!(
            "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
            BOUNDARY, name, value
        )
    }

    fn file_part(content_type: &str, bytes: &[u8]) -> Vec<u8> {
        let mut out = format!(
            "--{}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"dish.png\"\r\nContent-Type: {}\r\n\r\n",
            BOUNDARY, content_type
        )
        .into_bytes();
        out.extend_from_slice(bytes);
        out.extend_from_slice(b"\r\n");
        out
    }

    async fn extract(body: Vec<u8>) -> Result<RecipeForm, AppError> {
        let mut body = body;
        body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
        let (req, mut payload) = TestRequest::post()
            .insert_header((
                "content-type",
                format!("multipart/form-data; boundary={}", BOUNDARY),
            ))
            .set_payload(body)
            .to_http_parts();
        RecipeForm::from_request(&req, &mut payload).await
    }

    #[actix_web::test]
    async fn test_reads_fields_and_image() {
        let mut body = format!(
            "{}{}{}",
            part("name", "Margherita"),
            part("ingredients", "dough, tomato, basil"),
            part("cookingTime", "15"),
        )
        .into_bytes();
        body.extend(file_part("image/png", b"\x89PNG\r\n"));

        let form = extract(body).await.unwrap();
        assert_eq!(form.input.name.as_deref(), Some("Margherita"));
        assert_eq!(form.input.cooking_time.as_deref(), Some("15"));
        assert_eq!(
            form.input.ingredients,
            Some(IngredientsInput::Text("dough, tomato, basil".to_string()))
        );
        let image = form.image.unwrap();
        assert_eq!(image.content_type, "image/png");
        assert_eq!(image.file_name.as_deref(), Some("dish.png"));
    }

    #[actix_web::test]
    async fn test_repeated_ingredients_form_a_list() {
        let body = format!("{}{}", part("ingredients", "rice"), part("ingredients", "dal")).into_bytes();

        let form = extract(body).await.unwrap();
        assert_eq!(
            form.input.ingredients,
            Some(IngredientsInput::List(vec!["rice".to_string(), "dal".to_string()]))
        );
        assert!(form.image.is_none());
    }

    #[actix_web::test]
    async fn test_non_image_upload_is_rejected() {
        let err = extract(file_part("application/pdf", b"%PDF-1.7")).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(ref m) if m == "Only image files are allowed"));
    }

    #[actix_web::test]
    async fn test_second_image_is_rejected() {
        let mut body = file_part("image/png", b"one");
        body.extend(file_part("image/png", b"two"));

        assert!(matches!(extract(body).await, Err(AppError::BadRequest(_))));
    }

    #[actix_web::test]
    async fn test_json_body() {
        let (req, mut payload) = TestRequest::post()
            .set_json(serde_json::json!({
                "name": "Lemonade",
                "servings": 2,
                "ingredients": ["lemons", "sugar", "water"],
            }))
            .to_http_parts();

        let form = RecipeForm::from_request(&req, &mut payload).await.unwrap();
        assert_eq!(form.input.servings.as_deref(), Some("2"));
        assert!(matches!(form.input.ingredients, Some(IngredientsInput::List(ref v)) if v.len() == 3));
        assert!(form.image.is_none());
    }
}
