//! 字段容器（FieldSet）
//!
//! 模型实例的字段存储与脏字段追踪：
//! - `set` 为追踪写入：相同值写入为空操作，变更记入脏快照；
//! - 以 `_name` 形式写入的后备字段，脏键剥去一个前导下划线记为 `name`；
//! - 「无脏字段」以显式 `is_dirty` 标志表达，`has_changed` 只读标志，
//!   从不以快照大小推断，保证清理后的容器与从未变脏的容器不可区分；
//! - `id` 字段的存在与否决定实例是「已持久化」还是「新建」。
//!
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::LazyLock;

/// 字段映射类型：键为字段名、值为任意 JSON 值，保持插入顺序
pub type FieldMap = serde_json::Map<String, Value>;

// 干净状态下 `changed` 借出的共享空映射
static EMPTY: LazyLock<FieldMap> = LazyLock::new(FieldMap::new);

/// 字段容器：字段值 + 脏快照 + 脏标志
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FieldSet {
    values: FieldMap,
    dirty: FieldMap,
    is_dirty: bool,
}

impl FieldSet {
    /// 创建空容器（干净状态）
    pub fn new() -> Self {
        Self::default()
    }

    /// 读取字段原始存储值
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// 字段存储的只读视图
    pub fn values(&self) -> &FieldMap {
        &self.values
    }

    /// 追踪写入：
    /// - 与当前值相等时为空操作（不产生脏记录，无任何副作用）；
    /// - 否则记录脏键（剥去一个前导下划线）并写入存储。
    pub fn set(&mut self, name: &str, value: Value) {
        if self.values.get(name) == Some(&value) {
            return;
        }
        self.mark_dirty(name, value.clone());
        self.values.insert(name.to_string(), value);
    }

    /// 仅记录脏键与脏值，不触碰字段存储。
    /// 供计算属性的写入路径使用：赋值本身经由属性 setter 落到后备字段。
    pub(crate) fn mark_dirty(&mut self, name: &str, value: Value) {
        self.is_dirty = true;
        let dirty_key = name.strip_prefix('_').unwrap_or(name);
        self.dirty.insert(dirty_key.to_string(), value);
    }

    /// 非追踪移除：不产生脏记录
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.values.remove(name)
    }

    /// 清空脏状态（成功持久化边界、或构造时携带 id）
    pub fn clear_dirty(&mut self) {
        self.dirty.clear();
        self.is_dirty = false;
    }

    /// 自上一次持久化边界以来是否有字段变更
    pub fn has_changed(&self) -> bool {
        self.is_dirty
    }

    /// 脏快照：有变更时借出脏映射，否则借出共享空映射；从不修改状态
    pub fn changed(&self) -> &FieldMap {
        if self.is_dirty { &self.dirty } else { &EMPTY }
    }

    /// 是否为新建实例：`id` 字段缺失或为 null
    pub fn is_new(&self) -> bool {
        match self.values.get("id") {
            None | Some(Value::Null) => true,
            Some(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // 测试新建容器为干净状态
    #[test]
    fn test_new_is_clean() {
        let fields = FieldSet::new();
        assert!(!fields.has_changed());
        assert!(fields.changed().is_empty());
        assert!(fields.is_new());
    }

    // 测试写入记录脏键与存储值
    #[test]
    fn test_set_marks_dirty() {
        let mut fields = FieldSet::new();
        fields.set("name", json!("alice"));

        assert!(fields.has_changed());
        assert_eq!(fields.get("name"), Some(&json!("alice")));
        assert_eq!(fields.changed().get("name"), Some(&json!("alice")));
    }

    // 测试相同值写入为空操作
    #[test]
    fn test_set_same_value_is_noop() {
        let mut fields = FieldSet::new();
        fields.set("count", json!(3));
        fields.clear_dirty();

        fields.set("count", json!(3));
        assert!(!fields.has_changed());
        assert!(fields.changed().is_empty());
    }

    // 测试下划线后备字段的脏键剥离
    #[test]
    fn test_underscore_key_is_stripped_in_dirty() {
        let mut fields = FieldSet::new();
        fields.set("_name", json!("bob"));

        assert_eq!(fields.changed().get("name"), Some(&json!("bob")));
        assert!(fields.changed().get("_name").is_none());
        // 存储仍然落在后备字段名下
        assert_eq!(fields.get("_name"), Some(&json!("bob")));
        assert!(fields.get("name").is_none());
    }

    // 测试清理后与从未变脏的容器不可区分
    #[test]
    fn test_clear_dirty_matches_pristine() {
        let mut fields = FieldSet::new();
        fields.set("a", json!(1));
        fields.clear_dirty();

        let pristine = FieldSet::new();
        assert_eq!(fields.has_changed(), pristine.has_changed());
        assert_eq!(fields.changed(), pristine.changed());
    }

    // 测试清理后可再次变脏
    #[test]
    fn test_redirty_after_clear() {
        let mut fields = FieldSet::new();
        fields.set("a", json!(1));
        fields.clear_dirty();
        fields.set("a", json!(2));

        assert!(fields.has_changed());
        assert_eq!(fields.changed().get("a"), Some(&json!(2)));
        assert_eq!(fields.changed().len(), 1);
    }

    // 测试 id 判定：缺失、null 与存在
    #[test]
    fn test_is_new_by_id_presence() {
        let mut fields = FieldSet::new();
        assert!(fields.is_new());

        fields.set("id", Value::Null);
        assert!(fields.is_new());

        fields.set("id", json!("x-1"));
        assert!(!fields.is_new());
    }

    // 测试非追踪移除不产生脏记录
    #[test]
    fn test_remove_is_untracked() {
        let mut fields = FieldSet::new();
        fields.set("a", json!(1));
        fields.clear_dirty();

        assert_eq!(fields.remove("a"), Some(json!(1)));
        assert!(!fields.has_changed());
        assert!(fields.get("a").is_none());
    }

    // 测试序列化和反序列化
    #[test]
    fn test_fieldset_serde() {
        let mut fields = FieldSet::new();
        fields.set("name", json!("alice"));

        let json = serde_json::to_string(&fields).unwrap();
        let restored: FieldSet = serde_json::from_str(&json).unwrap();

        assert_eq!(restored.get("name"), Some(&json!("alice")));
        assert!(restored.has_changed());
        assert_eq!(restored.changed(), fields.changed());
    }
}
