//! 页面规范化 - 去除脚本、注释、广告等易变内容
//!
//! 解析为 HTML 片段后遍历节点树，整棵删除以下子树：
//! - `script` / `style` 元素
//! - 注释节点
//! - 带有动态标记 class 的元素（时间戳、计数器等）
//! - 嵌入第三方内容的元素（iframe、广告位、社交媒体挂件）
//!
//! `noscript` 的内容按 markup 重新解析后再参与上述过滤。
//! 剩余的树重新序列化为字符串，作为比较用的稳定形式。

use scraper::node::Node;
use scraper::Html;
use serde::{Deserialize, Serialize};

/// 总是删除的元素
const ALWAYS_REMOVED_TAGS: &[&str] = &["script", "style"];

/// 规范化策略（哪些 class / 标签视为噪声）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizePolicy {
    /// 动态内容标记 class
    pub dynamic_classes: Vec<String>,
    /// 嵌入第三方内容的标签名
    pub embed_tags: Vec<String>,
}

impl Default for NormalizePolicy {
    fn default() -> Self {
        Self {
            dynamic_classes: vec!["dynamic-class".to_string()],
            embed_tags: vec![
                "iframe".to_string(),
                "advertisement".to_string(),
                "social-media".to_string(),
            ],
        }
    }
}

impl NormalizePolicy {
    pub fn new(dynamic_classes: Vec<String>, embed_tags: Vec<String>) -> Self {
        Self {
            dynamic_classes,
            embed_tags,
        }
    }
}

/// 页面规范化器
#[derive(Debug, Clone)]
pub struct Normalizer {
    dynamic_classes: Vec<String>,
    /// 小写标签名（html5ever 解析后的标签名均为小写）
    removed_tags: Vec<String>,
}

impl Normalizer {
    pub fn new(policy: NormalizePolicy) -> Self {
        let removed_tags = ALWAYS_REMOVED_TAGS
            .iter()
            .map(|t| t.to_string())
            .chain(policy.embed_tags.iter().map(|t| t.trim().to_ascii_lowercase()))
            .filter(|t| !t.is_empty())
            .collect();

        Self {
            dynamic_classes: policy.dynamic_classes,
            removed_tags,
        }
    }

    /// 规范化原始 body markup
    ///
    /// 纯函数：相同输入总是得到相同输出。解析是尽力而为的，残缺的 markup
    /// 也会产出结果，最坏情况为空字符串。
    pub fn normalize(&self, raw: &str) -> String {
        let mut fragment = Html::parse_fragment(raw);
        expand_noscript(&mut fragment);

        let doomed: Vec<_> = fragment
            .tree
            .root()
            .descendants()
            .filter(|node| self.is_noise(node.value()))
            .map(|node| node.id())
            .collect();

        for id in doomed {
            if let Some(mut node) = fragment.tree.get_mut(id) {
                node.detach();
            }
        }

        fragment.root_element().inner_html()
    }

    fn is_noise(&self, node: &Node) -> bool {
        match node {
            Node::Comment(_) => true,
            Node::Element(element) => {
                self.removed_tags.iter().any(|t| t == element.name())
                    || element
                        .classes()
                        .any(|class| self.dynamic_classes.iter().any(|d| d == class))
            }
            _ => false,
        }
    }
}

/// 把 `noscript` 中的原始文本替换为解析后的节点
///
/// 开启脚本支持的解析器把 `noscript` 内容当作纯文本，里面的 iframe、
/// 追踪像素等会绕过噪声过滤。
fn expand_noscript(fragment: &mut Html) {
    let pending: Vec<_> = fragment
        .tree
        .root()
        .descendants()
        .filter(|node| matches!(node.value(), Node::Element(e) if e.name() == "noscript"))
        .filter(|node| node.has_children() && node.children().all(|c| c.value().is_text()))
        .map(|node| {
            let markup: String = node
                .children()
                .filter_map(|c| c.value().as_text())
                .map(|t| &**t)
                .collect();
            (node.id(), markup)
        })
        .collect();

    for (id, markup) in pending {
        let inner = Html::parse_fragment(&markup);

        let stale: Vec<_> = match fragment.tree.get(id) {
            Some(node) => node.children().map(|c| c.id()).collect(),
            None => continue,
        };
        for child in stale {
            if let Some(mut node) = fragment.tree.get_mut(child) {
                node.detach();
            }
        }

        let mut stack = vec![(inner.root_element().id(), id)];
        while let Some((src, dest)) = stack.pop() {
            let Some(src_node) = inner.tree.get(src) else {
                continue;
            };
            for child in src_node.children() {
                let Some(mut parent) = fragment.tree.get_mut(dest) else {
                    break;
                };
                let copied = parent.append(child.value().clone()).id();
                stack.push((child.id(), copied));
            }
        }
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(NormalizePolicy::default())
    }
}
