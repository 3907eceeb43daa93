/// Person 模型示例
/// 演示类型派生、计算属性、校验闸门与内存适配器上的完整生命周期
use async_trait::async_trait;
use model_domain::data_source::DataSource;
use model_domain::error::{ModelError, ModelResult};
use model_domain::fields::FieldMap;
use model_domain::model::Model;
use model_domain::model_type::{Computed, ModelType, TypeOverrides, ValidateFn};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

// ============================================================================
// 内存适配器
// ============================================================================

#[derive(Default)]
struct MemStore {
    rows: Mutex<HashMap<String, FieldMap>>,
}

#[async_trait]
impl DataSource for MemStore {
    async fn create(&self, model: &mut Model, _options: Option<&Value>) -> ModelResult<()> {
        let id = Uuid::new_v4().to_string();
        model.set("id", json!(id));
        let key = id_of(model)?;
        self.rows.lock().unwrap().insert(key, model.fields().clone());
        Ok(())
    }

    async fn update(&self, model: &mut Model, _options: Option<&Value>) -> ModelResult<()> {
        let key = id_of(model)?;
        self.rows.lock().unwrap().insert(key, model.fields().clone());
        Ok(())
    }

    async fn fetch(&self, model: &mut Model, _options: Option<&Value>) -> ModelResult<()> {
        let key = id_of(model)?;
        let row = self
            .rows
            .lock()
            .unwrap()
            .get(&key)
            .cloned()
            .ok_or_else(|| ModelError::adapter(anyhow::anyhow!("row not found: {key}")))?;
        model.set_fields(row);
        Ok(())
    }

    async fn destroy(&self, model: &mut Model, _options: Option<&Value>) -> ModelResult<()> {
        let key = id_of(model)?;
        self.rows.lock().unwrap().remove(&key);
        Ok(())
    }
}

fn id_of(model: &Model) -> ModelResult<String> {
    model
        .id()
        .and_then(|v| v.as_str().map(String::from))
        .ok_or_else(|| ModelError::implementation("operation requires an id"))
}

// ============================================================================
// Person 类型定义
// ============================================================================

fn person_type(store: Arc<MemStore>) -> Arc<ModelType> {
    // 计算属性：对外暴露 name，后备存储落在 _name；脏键自动剥离下划线
    let mut computed = HashMap::new();
    computed.insert(
        "name".to_string(),
        Computed::new(
            |model: &Model| model.fields().get("_name").cloned(),
            |model: &mut Model, value| model.set("_name", value),
        ),
    );

    // 校验：name 必填
    let validate: ValidateFn = Arc::new(|model| {
        Box::pin(async move {
            if model.get("name").is_none() {
                vec!["name is required".to_string()]
            } else {
                Vec::new()
            }
        })
    });

    let mut defaults = FieldMap::new();
    defaults.insert("role".to_string(), json!("member"));

    ModelType::base().derive(
        TypeOverrides::builder()
            .defaults(defaults)
            .computed(computed)
            .validate(validate)
            .data(store as Arc<dyn DataSource>)
            .build(),
    )
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let store = Arc::new(MemStore::default());
    let person = person_type(Arc::clone(&store));

    // 新建实例：默认值与初始字段均计入脏快照
    let mut alice = Model::new(Arc::clone(&person), None).await?;
    println!("new person, changed = {:?}", alice.changed());

    // 校验闸门：缺少 name 时 save 被拒
    match alice.save(None).await {
        Err(ModelError::Validation { messages }) => {
            println!("validation rejected: {messages:?}");
        }
        other => println!("unexpected: {other:?}"),
    }

    // 经计算属性写入 name 后放行
    alice.set("name", json!("Alice"));
    alice.save(None).await?;
    println!("saved, id = {:?}, dirty = {}", alice.id(), alice.has_changed());

    // 另起实例按 id 拉取
    let id = alice.id().cloned().expect("id assigned by create");
    let mut initial = FieldMap::new();
    initial.insert("id".to_string(), id);
    let mut loaded = Model::new(person, Some(initial)).await?;
    loaded.fetch(None).await?;
    println!(
        "fetched name = {:?}, refreshed_at = {:?}",
        loaded.get("name"),
        loaded.refreshed_at()
    );

    // 更新走 update 分支，随后销毁
    loaded.set("name", json!("Alice Liddell"));
    loaded.save(None).await?;
    loaded.destroy(None).await?;
    println!("rows left = {}", store.rows.lock().unwrap().len());

    Ok(())
}
